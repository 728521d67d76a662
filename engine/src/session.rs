use std::sync::{
    atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError, RwLock,
};

use netsync_shared::{
    ConditionedLink, ConnectionError, ConnectionState, LinkConditioner, Message, MessageQueues,
    MessageSink, MessageStamp, PerfectLink, Role, SequenceNumber, SessionStats, Timestamp,
};

use crate::{ReplicationConfig, ReplicationError};

/// State of one running session: its role, connection state machine,
/// queues, statistics and transport sinks. Shared by the facade, the
/// network components and the workers.
pub(crate) struct Session {
    role: Role,
    port: u16,
    // tells receivers that sequences restarted
    epoch: u64,
    running: AtomicBool,
    state: Mutex<ConnectionState>,
    server_address: Mutex<Option<String>>,
    next_sequence: AtomicU16,
    max_out_bytes_per_sec: AtomicU64,
    max_in_bytes_per_sec: AtomicU64,
    queues: Arc<MessageQueues>,
    stats: SessionStats,
    sinks: RwLock<Vec<Arc<dyn MessageSink>>>,
    link: Arc<dyn LinkConditioner>,
}

impl Session {
    pub fn new(role: Role, port: u16, config: &ReplicationConfig) -> Self {
        let link: Arc<dyn LinkConditioner> = match &config.link_conditioner {
            Some(link_config) => Arc::new(ConditionedLink::new(link_config.clone())),
            None => Arc::new(PerfectLink),
        };

        Self {
            role,
            port,
            epoch: fastrand::u64(..),
            running: AtomicBool::new(true),
            state: Mutex::new(ConnectionState::Disconnected),
            server_address: Mutex::new(None),
            next_sequence: AtomicU16::new(0),
            max_out_bytes_per_sec: AtomicU64::new(config.max_out_bytes_per_sec),
            max_in_bytes_per_sec: AtomicU64::new(config.max_in_bytes_per_sec),
            queues: Arc::new(MessageQueues::new()),
            stats: SessionStats::new(config.connection.bandwidth_measure_duration),
            sinks: RwLock::new(Vec::new()),
            link,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear the running flag, returning whether it was set
    pub fn stop(&self) -> bool {
        self.running.swap(false, Ordering::AcqRel)
    }

    // Connection state

    fn lock_state(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.lock_state()
    }

    pub fn transition(&self, to: ConnectionState) -> Result<(), ConnectionError> {
        self.lock_state().transition(to)
    }

    /// Shutdown leaves every session disconnected, whatever edge it was on
    pub fn force_disconnected(&self) {
        *self.lock_state() = ConnectionState::Disconnected;
    }

    pub fn server_address(&self) -> Option<String> {
        self.server_address
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_server_address(&self, address: String) {
        *self
            .server_address
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(address);
    }

    // Traffic

    /// Stamp `message` with the next session sequence number and queue it
    /// for the sender worker
    pub fn send(&self, message: &Message) -> Result<SequenceNumber, ReplicationError> {
        if !self.is_running() {
            return Err(ReplicationError::NotRunning);
        }
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.send_sequenced(message, sequence)?;
        Ok(sequence)
    }

    /// Queue `message` under a sequence number chosen by the caller, such as
    /// a property's own update counter
    pub fn send_sequenced(
        &self,
        message: &Message,
        sequence: SequenceNumber,
    ) -> Result<(), ReplicationError> {
        if !self.is_running() {
            return Err(ReplicationError::NotRunning);
        }
        let stamp = MessageStamp {
            origin: Some(self.role),
            epoch: self.epoch,
            sequence,
            sent_at: Timestamp::now_millis(),
        };
        self.queues
            .enqueue_outbound(message.stamped(stamp))
            .map_err(|_| ReplicationError::NotRunning)
    }

    /// Hand a message received by the transport to the inbound queue
    pub fn receive(&self, message: Message) -> Result<(), ReplicationError> {
        if !self.is_running() {
            return Err(ReplicationError::NotRunning);
        }
        self.queues
            .enqueue_inbound(message)
            .map_err(|_| ReplicationError::NotRunning)
    }

    pub fn queues(&self) -> &Arc<MessageQueues> {
        &self.queues
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn link(&self) -> &dyn LinkConditioner {
        self.link.as_ref()
    }

    // Sinks

    pub fn add_sink(&self, sink: Arc<dyn MessageSink>) {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
    }

    pub fn sinks(&self) -> Vec<Arc<dyn MessageSink>> {
        self.sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_sinks(&self) {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    // Bandwidth

    pub fn bandwidth_limits(&self) -> (u64, u64) {
        (
            self.max_out_bytes_per_sec.load(Ordering::Relaxed),
            self.max_in_bytes_per_sec.load(Ordering::Relaxed),
        )
    }

    pub fn set_bandwidth_limits(&self, max_out: u64, max_in: u64) {
        self.max_out_bytes_per_sec.store(max_out, Ordering::Relaxed);
        self.max_in_bytes_per_sec.store(max_in, Ordering::Relaxed);
    }
}
