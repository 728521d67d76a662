use std::default::Default;

use netsync_shared::{ConnectionConfig, LinkConditionerConfig};

/// Contains Config properties which will be used by the ReplicationSystem
#[derive(Clone, Debug)]
pub struct ReplicationConfig {
    /// Used to configure the session's workers and statistics
    pub connection: ConnectionConfig,
    /// Simulated latency and loss; `None` is a perfect link
    pub link_conditioner: Option<LinkConditionerConfig>,
    /// Whether a host session delivers its own outbound messages back into
    /// its inbound queue. Ignored by remotes.
    pub loopback: bool,
    /// Advisory outbound ceiling in bytes/sec, 0 is unlimited
    pub max_out_bytes_per_sec: u64,
    /// Advisory inbound ceiling in bytes/sec, 0 is unlimited
    pub max_in_bytes_per_sec: u64,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            link_conditioner: None,
            loopback: true,
            max_out_bytes_per_sec: 0,
            max_in_bytes_per_sec: 0,
        }
    }
}
