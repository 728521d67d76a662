use thiserror::Error;

use crate::ConnectionState;

/// Errors that can occur while driving the connection state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The requested transition is not an edge of the state machine
    #[error("Invalid connection state transition from {from} to {to}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },
}
