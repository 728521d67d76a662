use std::{sync::Arc, thread, time::Duration};

use log::{debug, trace};

use crate::session::Session;

/// Latency prober loop, run by remote sessions: while connected, refresh the
/// latency estimate from the link every `interval`. Woken early by shutdown.
pub(crate) fn run_prober(session: Arc<Session>, interval: Duration) {
    debug!("latency prober started");

    while session.is_running() {
        if session.connection_state().is_connected() {
            let latency_ms = session.link().sample_latency_ms();
            session.stats().set_latency_ms(latency_ms);
            trace!("latency estimate {:.1} ms", latency_ms);
        }
        thread::park_timeout(interval);
    }

    debug!("latency prober stopped");
}
