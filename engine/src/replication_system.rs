use std::{
    any::Any,
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::Duration,
};

use log::{debug, info, trace, warn};

use netsync_shared::{
    ConnectionState, Message, MessageKind, MessageSink, NetworkStats, ObjectDirectory, ObjectId,
    Role,
};

use crate::{
    dispatch::DispatchEngine, handlers::HandlerTable, session::Session, LoopbackSink,
    NetworkComponent, ReplicationConfig, ReplicationError,
};

const DEFAULT_DISCONNECT_REASON: &str = "disconnect requested";

/// Entry point of the library. Owns at most one running session at a time
/// together with its object directory and workers; every operation takes
/// `&self`, so the system can be shared across threads and shut down from
/// any of them.
pub struct ReplicationSystem {
    config: ReplicationConfig,
    handlers: Arc<HandlerTable>,
    bandwidth_limits: Mutex<(u64, u64)>,
    engine: RwLock<Option<Arc<DispatchEngine>>>,
}

impl ReplicationSystem {
    /// Create a new, not yet running, ReplicationSystem
    pub fn new(config: ReplicationConfig) -> Self {
        let bandwidth_limits = (config.max_out_bytes_per_sec, config.max_in_bytes_per_sec);
        Self {
            config,
            handlers: Arc::new(HandlerTable::new()),
            bandwidth_limits: Mutex::new(bandwidth_limits),
            engine: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    fn engine(&self) -> Option<Arc<DispatchEngine>> {
        self.engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn running_engine(&self) -> Result<Arc<DispatchEngine>, ReplicationError> {
        self.engine()
            .filter(|engine| engine.is_running())
            .ok_or(ReplicationError::NotRunning)
    }

    // Lifecycle

    /// Start a session in the given role. A host is connected as soon as it
    /// runs; a remote starts disconnected and dials out with
    /// `connect_to_server`.
    pub fn initialize(&self, role: Role, port: u16) -> Result<(), ReplicationError> {
        let mut slot = self.engine.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            warn!("initialize called while already running");
            return Err(ReplicationError::AlreadyRunning);
        }

        let session = Arc::new(Session::new(role, port, &self.config));
        let (max_out, max_in) = *self
            .bandwidth_limits
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        session.set_bandwidth_limits(max_out, max_in);

        if role.is_host() {
            session.transition(ConnectionState::Connected)?;
            if self.config.loopback {
                session.add_sink(Arc::new(LoopbackSink::new(session.queues().clone())));
            }
        }

        let directory = Arc::new(ObjectDirectory::new(role));
        let engine = DispatchEngine::start(
            session,
            directory,
            self.handlers.clone(),
            &self.config.connection,
        )?;
        *slot = Some(Arc::new(engine));

        info!("replication initialized as {} on port {}", role, port);
        Ok(())
    }

    /// Stop the workers, discard queued traffic and clear the directory.
    /// Idempotent and callable from any thread.
    pub fn shutdown(&self) {
        let engine = self
            .engine
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match engine {
            Some(engine) => {
                engine.stop();
                info!("replication shut down");
            }
            None => debug!("shutdown called while not running"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.engine().is_some_and(|engine| engine.is_running())
    }

    /// Process every inbound message received since the last tick, then
    /// drop directory entries whose objects no longer exist. Never blocks.
    /// Returns the number of messages processed.
    pub fn tick(&self, delta: Duration) -> usize {
        let Some(engine) = self.engine() else {
            return 0;
        };

        let processed = engine.process_inbound();
        let expired = engine.sweep_directory();
        trace!(
            "tick {:?}: {} messages processed, {} expired objects removed",
            delta,
            processed,
            expired.len()
        );
        processed
    }

    // Connection

    /// Dial a host. Only remotes in the `Disconnected` state may connect.
    /// The session is reported connected once the connect message is queued;
    /// no acknowledgement is awaited.
    pub fn connect_to_server(&self, address: &str, port: u16) -> Result<(), ReplicationError> {
        let engine = self.running_engine()?;
        let session = engine.session();

        if session.role().is_host() {
            warn!("connect_to_server is not available to a host");
            return Err(ReplicationError::InvalidRoleTransition {
                operation: "connect to a server",
                role: session.role(),
            });
        }

        if session.transition(ConnectionState::Connecting).is_err() {
            let state = session.connection_state();
            warn!("cannot connect while {}", state);
            return Err(ReplicationError::InvalidStateTransition {
                operation: "connect",
                state,
            });
        }

        let server_address = format!("{}:{}", address, port);
        session.set_server_address(server_address.clone());

        if let Err(err) = session.send(&Message::connect(server_address.clone().into_bytes())) {
            if let Err(rollback) = session.transition(ConnectionState::Disconnected) {
                warn!("could not roll back failed connect: {}", rollback);
            }
            return Err(err);
        }

        if let Err(err) = session.transition(ConnectionState::Connected) {
            warn!("connection state changed while connecting: {}", err);
            return Err(err.into());
        }

        info!("connected to {}", server_address);
        Ok(())
    }

    /// Leave the `Connected` state, sending a disconnect message carrying
    /// `reason`
    pub fn disconnect(&self, reason: Option<&str>) -> Result<(), ReplicationError> {
        let engine = self.running_engine()?;
        let session = engine.session();

        if session.transition(ConnectionState::Disconnecting).is_err() {
            let state = session.connection_state();
            warn!("cannot disconnect while {}", state);
            return Err(ReplicationError::InvalidStateTransition {
                operation: "disconnect",
                state,
            });
        }

        let reason = reason.unwrap_or(DEFAULT_DISCONNECT_REASON);
        if let Err(err) = session.send(&Message::disconnect(reason)) {
            warn!("disconnect message not sent: {}", err);
        }
        session.transition(ConnectionState::Disconnected)?;

        info!("disconnected: {}", reason);
        Ok(())
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.engine()
            .map(|engine| engine.session().connection_state())
            .unwrap_or_default()
    }

    pub fn role(&self) -> Option<Role> {
        self.engine().map(|engine| engine.session().role())
    }

    pub fn port(&self) -> Option<u16> {
        self.engine().map(|engine| engine.session().port())
    }

    /// Address passed to the last `connect_to_server`, as `address:port`
    pub fn server_address(&self) -> Option<String> {
        self.engine()
            .and_then(|engine| engine.session().server_address())
    }

    // Objects

    /// Register an application object for replication, under `object_id` or
    /// a generated id when `None`. The directory only keeps a weak handle:
    /// once the application drops the object its entry is swept on a later
    /// tick.
    pub fn register_object<T: Any + Send + Sync>(
        &self,
        object: &Arc<T>,
        object_id: Option<&str>,
    ) -> Result<NetworkComponent, ReplicationError> {
        let engine = self.running_engine()?;
        let live = engine
            .directory()
            .register(object_id, object)
            .map_err(|err| {
                warn!("cannot register object: {}", err);
                ReplicationError::from(err)
            })?;

        info!("registered network object {}", live.id());
        Ok(NetworkComponent::new(
            live.id().clone(),
            live.properties().clone(),
            engine.session().clone(),
        ))
    }

    /// Remove the registration of `object`. A no-op if it isn't registered.
    pub fn unregister_object<T: ?Sized>(&self, object: &Arc<T>) -> Option<ObjectId> {
        let engine = self.engine()?;
        let object_id = engine.directory().unregister_object(object)?;
        info!("unregistered network object {}", object_id);
        Some(object_id)
    }

    /// Remove the registration under `object_id`. A no-op if absent.
    pub fn unregister_id(&self, object_id: &str) -> bool {
        let Some(engine) = self.engine() else {
            return false;
        };
        let removed = engine.directory().unregister(object_id);
        if removed {
            info!("unregistered network object {}", object_id);
        }
        removed
    }

    /// The network component of a live registered object
    pub fn component(&self, object_id: &str) -> Result<NetworkComponent, ReplicationError> {
        let engine = self.running_engine()?;
        let live = engine.directory().resolve(object_id)?;
        Ok(NetworkComponent::new(
            live.id().clone(),
            live.properties().clone(),
            engine.session().clone(),
        ))
    }

    /// Number of directory entries, including expired ones not yet swept
    pub fn object_count(&self) -> usize {
        self.engine()
            .map(|engine| engine.directory().len())
            .unwrap_or(0)
    }

    // Messages

    /// Queue a message for the sender worker
    pub fn send(&self, message: Message) -> Result<(), ReplicationError> {
        let engine = self.running_engine()?;
        engine.session().send(&message)?;
        Ok(())
    }

    /// Transport boundary: hand over a message received from a peer. It is
    /// processed on the next tick.
    pub fn receive(&self, message: Message) -> Result<(), ReplicationError> {
        self.running_engine()?.session().receive(message)
    }

    /// Route received messages of `kind` to `handler`, replacing any previous
    /// handler. Property updates are always applied through the target
    /// object's registry and cannot be handled here.
    pub fn set_handler<F>(&self, kind: MessageKind, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        if kind == MessageKind::PropertyUpdate {
            warn!("property updates are applied by object registries, handler ignored");
            return;
        }
        if self.handlers.set(kind, Arc::new(handler)) {
            debug!("replaced handler for {} messages", kind);
        }
    }

    pub fn remove_handler(&self, kind: MessageKind) -> bool {
        self.handlers.remove(&kind)
    }

    /// Add a transport sink to the running session's fan-out set
    pub fn add_sink(&self, sink: Arc<dyn MessageSink>) -> Result<(), ReplicationError> {
        let engine = self.running_engine()?;
        debug!("added transport sink '{}'", sink.name());
        engine.session().add_sink(sink);
        Ok(())
    }

    /// Wait until the sender worker has handed off everything queued so far.
    /// Returns false if `timeout` elapsed first.
    pub fn flush(&self, timeout: Duration) -> bool {
        match self.engine() {
            Some(engine) => engine.session().queues().wait_outbound_idle(timeout),
            None => true,
        }
    }

    // Statistics

    pub fn stats(&self) -> NetworkStats {
        self.engine()
            .map(|engine| engine.session().stats().snapshot())
            .unwrap_or_default()
    }

    /// Set advisory bandwidth ceilings in bytes/sec, 0 meaning unlimited.
    /// They are reported, not enforced; only per-property cadence is.
    pub fn set_bandwidth_limits(&self, max_out: u64, max_in: u64) {
        *self
            .bandwidth_limits
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = (max_out, max_in);
        if let Some(engine) = self.engine() {
            engine.session().set_bandwidth_limits(max_out, max_in);
        }
    }

    /// Current advisory ceilings as `(max_out, max_in)` bytes/sec
    pub fn bandwidth_limits(&self) -> (u64, u64) {
        *self
            .bandwidth_limits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ReplicationSystem {
    fn default() -> Self {
        Self::new(ReplicationConfig::default())
    }
}

impl Drop for ReplicationSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}
