use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use netsync_shared::{Message, MessageKind};

/// Application callback for received messages of one kind
pub type MessageHandler = Arc<dyn Fn(&Message) + Send + Sync>;

/// Explicit mapping from message kind to handler. Unhandled kinds are
/// silently ignored by the dispatch engine.
pub(crate) struct HandlerTable {
    handlers: RwLock<HashMap<MessageKind, MessageHandler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Install `handler` for `kind`, returning whether one was replaced
    pub fn set(&self, kind: MessageKind, handler: MessageHandler) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, handler)
            .is_some()
    }

    pub fn remove(&self, kind: &MessageKind) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(kind)
            .is_some()
    }

    /// The handler is cloned out so it runs without the table locked
    pub fn get(&self, kind: &MessageKind) -> Option<MessageHandler> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(kind)
            .cloned()
    }
}
