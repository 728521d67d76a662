use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by a session's workers
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// How often the latency prober refreshes the latency estimate
    pub ping_interval: Duration,
    /// Window over which bytes/sec statistics are measured
    pub bandwidth_measure_duration: Duration,
}

impl ConnectionConfig {
    pub fn new(ping_interval: Duration, bandwidth_measure_duration: Duration) -> Self {
        Self {
            ping_interval,
            bandwidth_measure_duration,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(1),
            bandwidth_measure_duration: Duration::from_secs(1),
        }
    }
}
