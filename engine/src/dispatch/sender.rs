use std::sync::Arc;

use log::{debug, trace, warn};

use netsync_shared::{Message, OutboundItem};

use crate::session::Session;

/// Sender worker loop: drains the outbound queue in FIFO order until the
/// queues are closed
pub(crate) fn run_sender(session: Arc<Session>) {
    debug!("sender worker started");

    loop {
        let message = match session.queues().drain_outbound_blocking() {
            OutboundItem::Message(message) => message,
            OutboundItem::Shutdown => break,
        };

        send_message(&session, &message);
        session.queues().mark_outbound_delivered();
    }

    debug!("sender worker stopped");
}

fn send_message(session: &Session, message: &Message) {
    // only unreliable traffic is subject to simulated loss
    if !message.is_reliable() && session.link().should_drop(message) {
        session.stats().record_dropped();
        trace!(
            "simulated loss of {} message #{} for '{}'",
            message.kind(),
            message.sequence(),
            message.object_id()
        );
        return;
    }

    session.stats().record_sent(message.wire_size());

    let (max_out, _) = session.bandwidth_limits();
    if max_out > 0 {
        let out_rate = session.stats().out_bytes_per_sec();
        if out_rate > max_out as f32 {
            debug!(
                "outbound rate {:.0} B/s is above the advisory limit of {} B/s",
                out_rate, max_out
            );
        }
    }

    for sink in session.sinks() {
        if let Err(err) = sink.deliver(message) {
            warn!("failed to deliver {} message: {}", message.kind(), err);
        }
    }
}
