use log::{debug, info, trace};

use netsync_shared::{ApplyOutcome, Message, MessageKind, ObjectDirectory};

use crate::{handlers::HandlerTable, session::Session};

/// Processes the inbound queue on the thread calling `tick()`
pub(crate) struct InboundProcessor<'a> {
    session: &'a Session,
    directory: &'a ObjectDirectory,
    handlers: &'a HandlerTable,
}

impl<'a> InboundProcessor<'a> {
    pub fn new(
        session: &'a Session,
        directory: &'a ObjectDirectory,
        handlers: &'a HandlerTable,
    ) -> Self {
        Self {
            session,
            directory,
            handlers,
        }
    }

    /// Drain everything currently queued and route it, in queue order.
    /// Returns the number of messages processed.
    pub fn process(&self) -> usize {
        let messages = self.session.queues().drain_all_inbound();

        for message in &messages {
            self.session.stats().record_received(message.wire_size());
            self.route(message);
        }

        messages.len()
    }

    fn route(&self, message: &Message) {
        match message.kind() {
            MessageKind::Connect => {
                info!(
                    "connect received from {}",
                    String::from_utf8_lossy(message.payload())
                );
                self.dispatch_to_handler(message);
            }
            MessageKind::Disconnect => {
                info!(
                    "disconnect received: {}",
                    String::from_utf8_lossy(message.payload())
                );
                self.dispatch_to_handler(message);
            }
            MessageKind::EntityCreate | MessageKind::EntityDestroy => {
                debug!("{} received for '{}'", message.kind(), message.object_id());
                self.dispatch_to_handler(message);
            }
            MessageKind::PropertyUpdate => {
                self.apply_property_update(message);
            }
            MessageKind::System | MessageKind::Custom(_) => {
                if !self.dispatch_to_handler(message) {
                    trace!("no handler for {} message, dropped", message.kind());
                }
            }
        }
    }

    fn dispatch_to_handler(&self, message: &Message) -> bool {
        match self.handlers.get(&message.kind()) {
            Some(handler) => {
                handler(message);
                true
            }
            None => false,
        }
    }

    fn apply_property_update(&self, message: &Message) {
        // the target may have been destroyed concurrently, that is not an error
        let object = match self.directory.resolve(message.object_id().as_str()) {
            Ok(object) => object,
            Err(err) => {
                debug!(
                    "dropping update of '{}': {}",
                    message.property_name(),
                    err
                );
                return;
            }
        };

        match object.properties().apply_sequenced(
            message.property_name(),
            message.payload(),
            message.stamp(),
        ) {
            Ok(ApplyOutcome::Stale) => {
                trace!(
                    "dropping stale update #{} of '{}.{}'",
                    message.sequence(),
                    message.object_id(),
                    message.property_name()
                );
            }
            Ok(ApplyOutcome::Unauthorized) => {
                debug!(
                    "dropping update of '{}.{}' from a {} sender without authority",
                    message.object_id(),
                    message.property_name(),
                    message
                        .origin()
                        .map_or_else(|| "unknown".to_string(), |role| role.to_string())
                );
            }
            Ok(ApplyOutcome::Applied) | Ok(ApplyOutcome::NoCallback) => {}
            Err(err) => {
                debug!("dropping update for '{}': {}", message.object_id(), err);
            }
        }
    }
}
