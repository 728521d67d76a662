use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use log::{debug, info};

use crate::{DirectoryError, ObjectId, PropertyRegistry, Role};

struct ObjectRecord {
    handle: Weak<dyn Any + Send + Sync>,
    // identity of the referenced allocation, compared on unregister-by-object
    address: usize,
    properties: Arc<PropertyRegistry>,
}

impl ObjectRecord {
    fn is_alive(&self) -> bool {
        self.handle.strong_count() > 0
    }
}

fn address_of<T: ?Sized>(object: &Arc<T>) -> usize {
    Arc::as_ptr(object).cast::<()>() as usize
}

/// A directory entry whose object was still alive when resolved. Holding it
/// keeps the object alive.
#[derive(Clone)]
pub struct LiveObject {
    id: ObjectId,
    object: Arc<dyn Any + Send + Sync>,
    properties: Arc<PropertyRegistry>,
}

impl LiveObject {
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn properties(&self) -> &Arc<PropertyRegistry> {
        &self.properties
    }

    pub fn object(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.object
    }

    /// The application object as its concrete type, if it is a `T`
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.object.clone().downcast::<T>().ok()
    }
}

/// Maps network object ids to non-owning handles on application objects. The
/// application keeps ownership; entries whose object has been dropped are
/// never handed out and are reaped lazily or by `sweep_expired`.
pub struct ObjectDirectory {
    role: Role,
    records: Mutex<HashMap<ObjectId, ObjectRecord>>,
}

impl ObjectDirectory {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            records: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ObjectId, ObjectRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `object` under `requested_id`, or under a generated id when
    /// none (or an empty one) is given. A fresh property registry is attached
    /// to the object and returned with its entry.
    pub fn register<T: Any + Send + Sync>(
        &self,
        requested_id: Option<&str>,
        object: &Arc<T>,
    ) -> Result<LiveObject, DirectoryError> {
        let address = address_of(object);
        let mut records = self.lock();

        if let Some((existing_id, _)) = records
            .iter()
            .find(|(_, record)| record.address == address && record.is_alive())
        {
            return Err(DirectoryError::ObjectAlreadyRegistered {
                object_id: existing_id.to_string(),
            });
        }

        let object_id = match requested_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                let object_id = ObjectId::from(id);
                if let Some(record) = records.get(&object_id) {
                    if record.is_alive() {
                        return Err(DirectoryError::DuplicateId {
                            object_id: object_id.to_string(),
                        });
                    }
                    debug!("reclaiming id {} from an expired object", object_id);
                }
                object_id
            }
            None => loop {
                let object_id = ObjectId::generate(self.role);
                if !records.contains_key(&object_id) {
                    break object_id;
                }
            },
        };

        let handle: Arc<dyn Any + Send + Sync> = object.clone();
        let properties = Arc::new(PropertyRegistry::new(self.role));
        records.insert(
            object_id.clone(),
            ObjectRecord {
                handle: Arc::downgrade(&handle),
                address,
                properties: properties.clone(),
            },
        );

        Ok(LiveObject {
            id: object_id,
            object: handle,
            properties,
        })
    }

    /// Remove the mapping for `object_id`. Returns whether one existed.
    pub fn unregister(&self, object_id: &str) -> bool {
        self.lock().remove(&ObjectId::from(object_id)).is_some()
    }

    /// Remove the mapping that refers to `object`, if any, returning its id
    pub fn unregister_object<T: ?Sized>(&self, object: &Arc<T>) -> Option<ObjectId> {
        let address = address_of(object);
        let mut records = self.lock();
        let object_id = records
            .iter()
            .find(|(_, record)| record.address == address && record.is_alive())
            .map(|(object_id, _)| object_id.clone())?;
        records.remove(&object_id);
        Some(object_id)
    }

    /// Look up a live object. An entry found to be expired is removed.
    pub fn resolve(&self, object_id: &str) -> Result<LiveObject, DirectoryError> {
        let key = ObjectId::from(object_id);
        let mut records = self.lock();
        let Some(record) = records.get(&key) else {
            return Err(DirectoryError::NotFound {
                object_id: object_id.to_string(),
            });
        };

        let upgraded = record
            .handle
            .upgrade()
            .map(|object| (object, record.properties.clone()));

        match upgraded {
            Some((object, properties)) => Ok(LiveObject {
                id: key,
                object,
                properties,
            }),
            None => {
                records.remove(&key);
                Err(DirectoryError::Expired {
                    object_id: object_id.to_string(),
                })
            }
        }
    }

    /// Remove every entry whose object has been destroyed, returning the
    /// removed ids
    pub fn sweep_expired(&self) -> Vec<ObjectId> {
        let mut records = self.lock();
        let expired: Vec<ObjectId> = records
            .iter()
            .filter(|(_, record)| !record.is_alive())
            .map(|(object_id, _)| object_id.clone())
            .collect();

        for object_id in &expired {
            records.remove(object_id);
            info!("removed expired network object {}", object_id);
        }

        expired
    }

    pub fn contains(&self, object_id: &str) -> bool {
        self.lock().contains_key(&ObjectId::from(object_id))
    }

    /// Number of entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
