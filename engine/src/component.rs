use std::{sync::Arc, time::Instant};

use log::{trace, warn};

use netsync_shared::{
    Message, ObjectId, PropertyDescriptor, PropertyError, PropertyRegistry, PropertySettings, Role,
};

use crate::{session::Session, ReplicationError};

/// The network-facing facet of a registered object: its id and property
/// registry, bound to the session it was registered with. Cheap to clone.
#[derive(Clone)]
pub struct NetworkComponent {
    object_id: ObjectId,
    properties: Arc<PropertyRegistry>,
    session: Arc<Session>,
}

impl NetworkComponent {
    pub(crate) fn new(
        object_id: ObjectId,
        properties: Arc<PropertyRegistry>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            object_id,
            properties,
            session,
        }
    }

    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    pub fn role(&self) -> Role {
        self.properties.role()
    }

    pub fn properties(&self) -> &PropertyRegistry {
        &self.properties
    }

    pub fn descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        self.properties.descriptor(name)
    }

    /// Declare a replicated property on this object
    pub fn register_property(
        &self,
        name: &str,
        settings: PropertySettings,
    ) -> Result<(), ReplicationError> {
        self.properties.register(name, settings).map_err(|err| {
            warn!("'{}': {}", self.object_id, err);
            err.into()
        })
    }

    /// Install the callback run when a received update for `name` is applied
    pub fn set_update_callback<F>(&self, name: &str, callback: F) -> Result<(), ReplicationError>
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.properties
            .set_update_callback(name, callback)
            .map_err(|err| {
                warn!("'{}': {}", self.object_id, err);
                err.into()
            })
    }

    /// Queue an update of `name` carrying `payload`, if this side has
    /// authority over the property and its rate limit allows it now.
    /// Denials are expected outcomes; retry on a later tick.
    pub fn send_property_update(&self, name: &str, payload: &[u8]) -> Result<(), ReplicationError> {
        self.send_property_update_at(name, payload, Instant::now())
    }

    /// `send_property_update` evaluated at an explicit instant
    pub fn send_property_update_at(
        &self,
        name: &str,
        payload: &[u8],
        now: Instant,
    ) -> Result<(), ReplicationError> {
        if !self.session.is_running() {
            return Err(ReplicationError::NotRunning);
        }

        let permit = self
            .properties
            .try_acquire_send(name, now)
            .map_err(|err| {
                match &err {
                    PropertyError::RateLimited { .. } => trace!("'{}': {}", self.object_id, err),
                    _ => warn!("'{}': {}", self.object_id, err),
                }
                ReplicationError::from(err)
            })?;

        let message =
            Message::property_update(self.object_id.clone(), name, payload.to_vec(), permit.reliable);
        self.session.send_sequenced(&message, permit.sequence)
    }
}
