//! # Netsync Shared
//! Building blocks shared by every netsync session: the message value type and
//! its queues, per-object property registries, the network object directory,
//! the connection state machine and running statistics.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod backends;
mod connection;
mod directory;
mod messages;
mod properties;
mod transport;
mod types;
mod wrapping_number;

pub use backends::{TimeError, Timestamp};
pub use connection::{
    bandwidth_monitor::BandwidthMonitor,
    connection_config::ConnectionConfig,
    connection_state::ConnectionState,
    error::ConnectionError,
    link_conditioner::{ConditionedLink, LinkConditioner, LinkConditionerConfig, PerfectLink},
    session_stats::{NetworkStats, SessionStats},
};
pub use directory::{
    error::DirectoryError,
    object_directory::{LiveObject, ObjectDirectory},
    object_id::ObjectId,
};
pub use messages::{
    error::QueueError,
    message::{Message, MessageKind, MessageStamp},
    message_queues::{MessageQueues, OutboundItem},
};
pub use properties::{
    authority::AuthorityMode,
    error::PropertyError,
    property_registry::{
        ApplyOutcome, PropertyDescriptor, PropertyRegistry, PropertySettings, SendPermit,
        UpdateCallback,
    },
};
pub use transport::{MessageSink, SendError};
pub use types::{Role, SequenceNumber};
pub use wrapping_number::{sequence_greater_than, sequence_less_than};
