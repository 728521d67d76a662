/// In-memory links between systems for E2E testing

use std::sync::Arc;

use netsync_engine::{PeerSink, ReplicationError, ReplicationSystem};

/// Make everything `from` sends arrive at `to`
pub fn link_systems(
    from: &Arc<ReplicationSystem>,
    to: &Arc<ReplicationSystem>,
) -> Result<(), ReplicationError> {
    from.add_sink(Arc::new(PeerSink::new("local-link", to)))
}
