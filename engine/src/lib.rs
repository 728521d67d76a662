//! # Netsync Engine
//! Keeps named properties of application objects in sync between one
//! authoritative host and its remotes. Outbound traffic is drained by a
//! dedicated sender worker; inbound traffic is processed on the caller's
//! thread once per `tick()`.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use netsync_shared::{
        sequence_greater_than, sequence_less_than, ApplyOutcome, BandwidthMonitor,
        ConditionedLink, ConnectionError, DirectoryError, LinkConditioner, LiveObject,
        MessageQueues, MessageStamp, ObjectDirectory, PerfectLink, PropertyDescriptor, PropertyError,
        PropertyRegistry, QueueError, SendPermit, SequenceNumber, SessionStats, Timestamp,
        UpdateCallback,
    };
}

pub use netsync_shared::{
    AuthorityMode, ConnectionConfig, ConnectionState, LinkConditionerConfig, Message,
    MessageKind, MessageSink, NetworkStats, ObjectId, PropertySettings, Role, SendError,
};

mod component;
mod config;
mod dispatch;
mod error;
mod handlers;
mod replication_system;
mod session;
mod transport;

pub use component::NetworkComponent;
pub use config::ReplicationConfig;
pub use error::ReplicationError;
pub use handlers::MessageHandler;
pub use replication_system::ReplicationSystem;
pub use transport::{LoopbackSink, PeerSink};
