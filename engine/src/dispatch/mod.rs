mod inbound;
mod prober;
mod sender;

use std::{
    sync::{Arc, Mutex, PoisonError},
    thread::{self, JoinHandle},
};

use log::warn;

use netsync_shared::{ConnectionConfig, ObjectDirectory, ObjectId, Role};

use crate::{handlers::HandlerTable, session::Session, ReplicationError};

use inbound::InboundProcessor;

/// Owns the workers of one session: the outbound sender, and for remotes
/// the latency prober. Inbound processing runs on the caller's thread.
pub(crate) struct DispatchEngine {
    session: Arc<Session>,
    directory: Arc<ObjectDirectory>,
    handlers: Arc<HandlerTable>,
    sender: Mutex<Option<JoinHandle<()>>>,
    prober: Mutex<Option<JoinHandle<()>>>,
}

impl DispatchEngine {
    /// Spawn the workers for `session`
    pub fn start(
        session: Arc<Session>,
        directory: Arc<ObjectDirectory>,
        handlers: Arc<HandlerTable>,
        connection_config: &ConnectionConfig,
    ) -> Result<Self, ReplicationError> {
        let sender = {
            let session = session.clone();
            thread::Builder::new()
                .name("netsync-sender".to_string())
                .spawn(move || sender::run_sender(session))
                .map_err(|err| ReplicationError::WorkerSpawnFailed {
                    worker: "sender",
                    reason: err.to_string(),
                })?
        };

        let engine = Self {
            session: session.clone(),
            directory,
            handlers,
            sender: Mutex::new(Some(sender)),
            prober: Mutex::new(None),
        };

        if session.role() == Role::Remote {
            let interval = connection_config.ping_interval;
            let prober_session = session.clone();
            let spawned = thread::Builder::new()
                .name("netsync-prober".to_string())
                .spawn(move || prober::run_prober(prober_session, interval));
            match spawned {
                Ok(prober) => {
                    *engine.prober.lock().unwrap_or_else(PoisonError::into_inner) = Some(prober);
                }
                Err(err) => {
                    // don't leave the sender running behind a failed start
                    engine.stop();
                    return Err(ReplicationError::WorkerSpawnFailed {
                        worker: "prober",
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(engine)
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn directory(&self) -> &Arc<ObjectDirectory> {
        &self.directory
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    /// Process every inbound message queued so far
    pub fn process_inbound(&self) -> usize {
        InboundProcessor::new(&self.session, &self.directory, &self.handlers).process()
    }

    pub fn sweep_directory(&self) -> Vec<ObjectId> {
        self.directory.sweep_expired()
    }

    /// Stop the workers and discard all queued traffic and registrations.
    /// Safe to call more than once.
    pub fn stop(&self) {
        self.session.stop();
        self.session.queues().close();

        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let prober = self
            .prober
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(prober) = &prober {
            prober.thread().unpark();
        }
        if let Some(sender) = sender {
            if sender.join().is_err() {
                warn!("sender worker panicked before shutdown");
            }
        }
        if let Some(prober) = prober {
            if prober.join().is_err() {
                warn!("latency prober panicked before shutdown");
            }
        }

        self.session.queues().clear();
        self.session.clear_sinks();
        self.session.force_disconnected();
        self.directory.clear();
    }
}
