use std::sync::Arc;

use netsync_shared::{Message, MessageQueues, MessageSink, SendError};

/// Delivers a session's outbound messages into its own inbound queue, so a
/// host processes its updates like any listener would
pub struct LoopbackSink {
    queues: Arc<MessageQueues>,
}

impl LoopbackSink {
    pub fn new(queues: Arc<MessageQueues>) -> Self {
        Self { queues }
    }
}

impl MessageSink for LoopbackSink {
    fn name(&self) -> &str {
        "loopback"
    }

    fn deliver(&self, message: &Message) -> Result<(), SendError> {
        self.queues
            .enqueue_inbound(message.clone())
            .map_err(|_| SendError::Disconnected {
                sink: self.name().to_string(),
            })
    }
}
