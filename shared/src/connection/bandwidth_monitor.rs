use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Measures throughput over a sliding time window
pub struct BandwidthMonitor {
    window: Duration,
    samples: VecDeque<(Instant, usize)>,
    window_bytes: usize,
}

impl BandwidthMonitor {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            samples: VecDeque::new(),
            window_bytes: 0,
        }
    }

    pub fn record(&mut self, now: Instant, bytes: usize) {
        self.prune(now);
        self.samples.push_back((now, bytes));
        self.window_bytes += bytes;
    }

    /// Average bytes per second over the window ending at `now`
    pub fn bytes_per_sec(&mut self, now: Instant) -> f32 {
        self.prune(now);
        let seconds = self.window.as_secs_f32();
        if seconds <= 0.0 {
            return 0.0;
        }
        self.window_bytes as f32 / seconds
    }

    fn prune(&mut self, now: Instant) {
        while let Some((recorded_at, bytes)) = self.samples.front() {
            if now.saturating_duration_since(*recorded_at) <= self.window {
                break;
            }
            self.window_bytes -= *bytes;
            self.samples.pop_front();
        }
    }
}
