use thiserror::Error;

/// Errors a transport sink can report when handed a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The receiving end has gone away
    #[error("Transport sink '{sink}' is disconnected")]
    Disconnected { sink: String },

    /// The receiving end refused the message
    #[error("Transport sink '{sink}' rejected the message: {reason}")]
    Rejected { sink: String, reason: String },
}
