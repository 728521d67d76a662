use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use log::{info, warn};

use netsync_engine::{
    MessageKind, NetworkComponent, PeerSink, PropertySettings, ReplicationConfig,
    ReplicationError, ReplicationSystem, Role,
};

const HOST_PORT: u16 = 7777;

pub struct Character {
    pub name: String,
}

/// A host and one remote linked in-process. The host owns a character whose
/// health drains every frame; the remote mirrors it.
pub struct App {
    host: Arc<ReplicationSystem>,
    remote: Arc<ReplicationSystem>,
    host_character: Arc<Character>,
    remote_character: Arc<Character>,
    host_component: NetworkComponent,
    remote_health: Arc<AtomicU32>,
    health: u32,
}

impl App {
    pub fn new() -> Result<Self, ReplicationError> {
        let host = Arc::new(ReplicationSystem::new(ReplicationConfig::default()));
        host.initialize(Role::Host, HOST_PORT)?;

        let remote = Arc::new(ReplicationSystem::new(ReplicationConfig::default()));
        remote.initialize(Role::Remote, 0)?;

        host.add_sink(Arc::new(PeerSink::new("to-remote", &remote)))?;
        remote.add_sink(Arc::new(PeerSink::new("to-host", &host)))?;

        host.set_handler(MessageKind::Connect, |message| {
            info!(
                "Host accepted connection from: {}",
                String::from_utf8_lossy(message.payload())
            );
        });
        remote.connect_to_server("127.0.0.1", HOST_PORT)?;

        let host_character = Arc::new(Character {
            name: "charlie".to_string(),
        });
        let host_component = host.register_object(&host_character, Some("player1"))?;
        host_component.register_property("health", PropertySettings::authoritative(5.0))?;

        let remote_character = Arc::new(Character {
            name: "charlie".to_string(),
        });
        let remote_component = remote.register_object(&remote_character, Some("player1"))?;
        remote_component.register_property("health", PropertySettings::authoritative(5.0))?;

        let remote_health = Arc::new(AtomicU32::new(0));
        {
            let remote_health = remote_health.clone();
            remote_component.set_update_callback("health", move |payload| {
                if let Ok(bytes) = <[u8; 4]>::try_from(payload) {
                    remote_health.store(u32::from_le_bytes(bytes), Ordering::Relaxed);
                }
            })?;
        }

        // the remote is not allowed to write the host's health
        if let Err(err) = remote_component.send_property_update("health", &0u32.to_le_bytes()) {
            info!("Remote update refused as expected: {}", err);
        }

        Ok(Self {
            host,
            remote,
            host_character,
            remote_character,
            host_component,
            remote_health,
            health: 100,
        })
    }

    pub fn update(&mut self, delta: Duration) {
        self.health = self.health.saturating_sub(1);

        match self
            .host_component
            .send_property_update("health", &self.health.to_le_bytes())
        {
            Ok(()) => info!(
                "Host sent {}'s health: {}",
                self.host_character.name, self.health
            ),
            Err(ReplicationError::Property(_)) => {}
            Err(err) => warn!("Host could not send health: {}", err),
        }

        self.host.tick(delta);
        self.remote.tick(delta);
    }

    pub fn finish(self) {
        self.host.flush(Duration::from_secs(1));
        self.remote.tick(Duration::ZERO);

        info!(
            "Remote sees {}'s health at {}",
            self.remote_character.name,
            self.remote_health.load(Ordering::Relaxed)
        );

        let stats = self.host.stats();
        info!(
            "Host sent {} bytes, received {} bytes",
            stats.bytes_sent, stats.bytes_received
        );

        if let Err(err) = self.remote.disconnect(Some("demo finished")) {
            warn!("Remote disconnect failed: {}", err);
        }
        self.remote.shutdown();
        self.host.shutdown();
    }
}
