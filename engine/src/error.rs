use thiserror::Error;

use netsync_shared::{ConnectionError, ConnectionState, DirectoryError, PropertyError, Role};

/// Errors surfaced by the replication system's public operations. None of
/// them are fatal: the failed call is a no-op and may be retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplicationError {
    /// `initialize` called while a session is running
    #[error("Replication system is already running, call `shutdown()` first")]
    AlreadyRunning,

    /// Operation needs a running session
    #[error("Replication system is not running, call `initialize()` first")]
    NotRunning,

    /// Operation not available to this session's role
    #[error("Cannot {operation} while running as {role}")]
    InvalidRoleTransition {
        operation: &'static str,
        role: Role,
    },

    /// Operation not available in the current connection state
    #[error("Cannot {operation} while the connection is {state}")]
    InvalidStateTransition {
        operation: &'static str,
        state: ConnectionState,
    },

    /// A worker thread could not be started
    #[error("Failed to start the {worker} worker: {reason}")]
    WorkerSpawnFailed {
        worker: &'static str,
        reason: String,
    },

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
}
