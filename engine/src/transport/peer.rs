use std::sync::{Arc, Weak};

use netsync_shared::{Message, MessageSink, SendError};

use crate::ReplicationSystem;

/// In-process transport: delivers every message into the inbound queue of
/// another `ReplicationSystem`. The peer is held weakly, so two linked
/// systems can still be dropped.
pub struct PeerSink {
    name: String,
    peer: Weak<ReplicationSystem>,
}

impl PeerSink {
    pub fn new(name: &str, peer: &Arc<ReplicationSystem>) -> Self {
        Self {
            name: name.to_string(),
            peer: Arc::downgrade(peer),
        }
    }
}

impl MessageSink for PeerSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, message: &Message) -> Result<(), SendError> {
        let Some(peer) = self.peer.upgrade() else {
            return Err(SendError::Disconnected {
                sink: self.name.clone(),
            });
        };
        peer.receive(message.clone())
            .map_err(|err| SendError::Rejected {
                sink: self.name.clone(),
                reason: err.to_string(),
            })
    }
}
