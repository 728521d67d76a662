mod error;

pub use error::SendError;

use crate::Message;

/// Delivery boundary of a session: every message the sender worker lets
/// through is handed to each registered sink. Real sockets and wire encoding
/// live behind this trait.
pub trait MessageSink: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    fn deliver(&self, message: &Message) -> Result<(), SendError>;
}
