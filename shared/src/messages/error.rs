use thiserror::Error;

/// Errors that can occur while pushing into the message queues
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queues were closed by a shutdown; nothing more is accepted
    #[error("Message queue is closed, the session is shutting down or already stopped")]
    Closed,
}
