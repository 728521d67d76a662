use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use crate::{
    sequence_greater_than, AuthorityMode, MessageStamp, PropertyError, Role, SequenceNumber,
};

/// Invoked with the payload of every update applied to a property
pub type UpdateCallback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// How a property is replicated: who may write it, how often and how
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertySettings {
    pub authority: AuthorityMode,
    /// Higher priority properties are meant to be scheduled first
    pub priority: f32,
    /// Maximum number of updates per second
    pub frequency_hz: f32,
    pub reliable: bool,
}

impl PropertySettings {
    pub fn new(authority: AuthorityMode, frequency_hz: f32) -> Self {
        Self {
            authority,
            priority: 1.0,
            frequency_hz,
            reliable: true,
        }
    }

    pub fn authoritative(frequency_hz: f32) -> Self {
        Self::new(AuthorityMode::Authoritative, frequency_hz)
    }

    pub fn predictive(frequency_hz: f32) -> Self {
        Self::new(AuthorityMode::Predictive, frequency_hz)
    }

    pub fn interpolated(frequency_hz: f32) -> Self {
        Self::new(AuthorityMode::Interpolated, frequency_hz)
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_reliable(mut self, reliable: bool) -> Self {
        self.reliable = reliable;
        self
    }

    /// Shortest allowed gap between two sends. Frequencies too low to
    /// represent saturate at `Duration::MAX`.
    pub fn min_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / f64::from(self.frequency_hz)).unwrap_or(Duration::MAX)
    }

    fn is_valid_frequency(&self) -> bool {
        self.frequency_hz.is_finite() && self.frequency_hz > 0.0
    }
}

/// The declared settings of one property plus its replication bookkeeping
#[derive(Clone, Debug)]
pub struct PropertyDescriptor {
    name: String,
    settings: PropertySettings,
    last_sent_at: Option<Instant>,
    next_send_sequence: SequenceNumber,
    // (sender epoch, sequence) of the newest update applied
    last_applied: Option<(u64, SequenceNumber)>,
}

impl PropertyDescriptor {
    fn new(name: &str, settings: PropertySettings) -> Self {
        Self {
            name: name.to_string(),
            settings,
            last_sent_at: None,
            next_send_sequence: 0,
            last_applied: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &PropertySettings {
        &self.settings
    }

    pub fn authority(&self) -> AuthorityMode {
        self.settings.authority
    }

    pub fn last_sent_at(&self) -> Option<Instant> {
        self.last_sent_at
    }

    pub fn last_applied_sequence(&self) -> Option<SequenceNumber> {
        self.last_applied.map(|(_, sequence)| sequence)
    }
}

/// Granted by `try_acquire_send`; carries what the caller needs to build the
/// outgoing message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendPermit {
    pub authority: AuthorityMode,
    pub reliable: bool,
    /// Position of this send in the property's own update sequence
    pub sequence: SequenceNumber,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The update callback ran
    Applied,
    /// The property is known but has no callback; nothing to do
    NoCallback,
    /// An update at least as new was already applied; this one was discarded
    Stale,
    /// The sender is not allowed to write this property; discarded
    Unauthorized,
}

struct RegistryInner {
    descriptors: HashMap<String, PropertyDescriptor>,
    callbacks: HashMap<String, UpdateCallback>,
}

/// Per-object table of replicated properties. Shared between the thread that
/// owns the object and the dispatch engine, so every read and write happens
/// under one lock.
pub struct PropertyRegistry {
    role: Role,
    inner: Mutex<RegistryInner>,
}

impl PropertyRegistry {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            inner: Mutex::new(RegistryInner {
                descriptors: HashMap::new(),
                callbacks: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Role of the session this registry belongs to
    pub fn role(&self) -> Role {
        self.role
    }

    /// Declare a property. Fails if the name is already declared or the
    /// frequency is not a positive finite number.
    pub fn register(&self, name: &str, settings: PropertySettings) -> Result<(), PropertyError> {
        if !settings.is_valid_frequency() {
            return Err(PropertyError::InvalidFrequency {
                name: name.to_string(),
                frequency_hz: settings.frequency_hz,
            });
        }

        let mut inner = self.lock();
        if inner.descriptors.contains_key(name) {
            return Err(PropertyError::AlreadyRegistered {
                name: name.to_string(),
            });
        }
        inner
            .descriptors
            .insert(name.to_string(), PropertyDescriptor::new(name, settings));
        Ok(())
    }

    /// Install the callback run when an update for `name` is applied,
    /// replacing any previous one
    pub fn set_update_callback<F>(&self, name: &str, callback: F) -> Result<(), PropertyError>
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        if !inner.descriptors.contains_key(name) {
            return Err(PropertyError::NotRegistered {
                name: name.to_string(),
            });
        }
        inner.callbacks.insert(name.to_string(), Arc::new(callback));
        Ok(())
    }

    /// Check whether `name` may be sent at `now` and, if so, record `now` as
    /// its last send time in the same critical section. A denied attempt
    /// leaves the timestamp untouched.
    pub fn try_acquire_send(&self, name: &str, now: Instant) -> Result<SendPermit, PropertyError> {
        let mut inner = self.lock();
        let Some(descriptor) = inner.descriptors.get_mut(name) else {
            return Err(PropertyError::NotRegistered {
                name: name.to_string(),
            });
        };

        if self.role == Role::Remote && descriptor.settings.authority == AuthorityMode::Authoritative
        {
            return Err(PropertyError::AuthorityDenied {
                name: name.to_string(),
            });
        }

        if let Some(last_sent_at) = descriptor.last_sent_at {
            let elapsed = now.saturating_duration_since(last_sent_at);
            let min_interval = descriptor.settings.min_interval();
            if elapsed < min_interval {
                let remaining = min_interval - elapsed;
                return Err(PropertyError::RateLimited {
                    name: name.to_string(),
                    retry_in_ms: u64::try_from(remaining.as_millis().max(1)).unwrap_or(u64::MAX),
                });
            }
        }

        let sequence = descriptor.next_send_sequence;
        descriptor.next_send_sequence = sequence.wrapping_add(1);
        descriptor.last_sent_at = Some(now);
        Ok(SendPermit {
            authority: descriptor.settings.authority,
            reliable: descriptor.settings.reliable,
            sequence,
        })
    }

    /// Run the update callback for `name` with `payload`. A property without
    /// a callback is not an error.
    pub fn apply(&self, name: &str, payload: &[u8]) -> Result<ApplyOutcome, PropertyError> {
        let callback = {
            let inner = self.lock();
            if !inner.descriptors.contains_key(name) {
                return Err(PropertyError::NotRegistered {
                    name: name.to_string(),
                });
            }
            inner.callbacks.get(name).cloned()
        };

        Ok(Self::invoke(callback, payload))
    }

    /// Like `apply`, but checked against the sender's `stamp`. Updates of a
    /// single-writer property are only taken from a host, and are discarded
    /// as stale unless their sequence is newer than the last one applied
    /// from the same sender session. An update from a new session (another
    /// epoch) restarts the ordering.
    pub fn apply_sequenced(
        &self,
        name: &str,
        payload: &[u8],
        stamp: &MessageStamp,
    ) -> Result<ApplyOutcome, PropertyError> {
        let callback = {
            let mut inner = self.lock();
            let Some(descriptor) = inner.descriptors.get_mut(name) else {
                return Err(PropertyError::NotRegistered {
                    name: name.to_string(),
                });
            };

            if descriptor.settings.authority.is_single_writer() {
                if stamp.origin != Some(Role::Host) {
                    return Ok(ApplyOutcome::Unauthorized);
                }
                if let Some((epoch, last)) = descriptor.last_applied {
                    if epoch == stamp.epoch && !sequence_greater_than(stamp.sequence, last) {
                        return Ok(ApplyOutcome::Stale);
                    }
                }
                descriptor.last_applied = Some((stamp.epoch, stamp.sequence));
            }

            inner.callbacks.get(name).cloned()
        };

        // callback runs outside the lock, it may call back into this registry
        Ok(Self::invoke(callback, payload))
    }

    fn invoke(callback: Option<UpdateCallback>, payload: &[u8]) -> ApplyOutcome {
        match callback {
            Some(callback) => {
                callback(payload);
                ApplyOutcome::Applied
            }
            None => ApplyOutcome::NoCallback,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().descriptors.contains_key(name)
    }

    pub fn descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        self.lock().descriptors.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Property names ordered from highest to lowest priority, ties by name
    pub fn property_names_by_priority(&self) -> Vec<String> {
        let inner = self.lock();
        let mut entries: Vec<(&String, f32)> = inner
            .descriptors
            .iter()
            .map(|(name, descriptor)| (name, descriptor.settings.priority))
            .collect();
        entries.sort_by(|(a_name, a_priority), (b_name, b_priority)| {
            b_priority.total_cmp(a_priority).then_with(|| a_name.cmp(b_name))
        });
        entries.into_iter().map(|(name, _)| name.clone()).collect()
    }
}
