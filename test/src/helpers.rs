use std::{
    sync::{Arc, Mutex, PoisonError},
    thread,
    time::{Duration, Instant},
};

use netsync_engine::{ConnectionConfig, ReplicationConfig, ReplicationSystem, Role};

pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);
pub const TICK: Duration = Duration::from_millis(16);

/// Install env_logger once for the test binary; later calls are ignored
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Stand-in for an application-owned game object
#[derive(Debug)]
pub struct TestObject {
    pub name: String,
}

impl TestObject {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
        })
    }
}

/// Config with a short probe interval so remote workers react quickly
pub fn test_config() -> ReplicationConfig {
    ReplicationConfig {
        connection: ConnectionConfig::new(Duration::from_millis(10), Duration::from_secs(1)),
        ..ReplicationConfig::default()
    }
}

pub fn running_host(port: u16) -> Arc<ReplicationSystem> {
    let system = Arc::new(ReplicationSystem::new(test_config()));
    system
        .initialize(Role::Host, port)
        .expect("host should initialize");
    system
}

pub fn running_remote() -> Arc<ReplicationSystem> {
    let system = Arc::new(ReplicationSystem::new(test_config()));
    system
        .initialize(Role::Remote, 0)
        .expect("remote should initialize");
    system
}

/// Collects every payload handed to an update callback
#[derive(Clone, Default)]
pub struct PayloadRecorder {
    payloads: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl PayloadRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl Fn(&[u8]) + Send + Sync + 'static {
        let payloads = self.payloads.clone();
        move |payload: &[u8]| {
            payloads
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(payload.to_vec());
        }
    }

    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.payloads().len()
    }
}

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_for<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Flush `system`'s sender, then tick `receiver` once
pub fn flush_and_tick(system: &ReplicationSystem, receiver: &ReplicationSystem) -> usize {
    assert!(system.flush(FLUSH_TIMEOUT), "sender did not go idle in time");
    receiver.tick(TICK)
}
