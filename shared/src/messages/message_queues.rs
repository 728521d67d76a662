use std::{
    collections::VecDeque,
    mem,
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use crate::{Message, QueueError};

/// What the sender worker receives from `drain_outbound_blocking`
#[derive(Debug)]
pub enum OutboundItem {
    Message(Message),
    Shutdown,
}

struct OutboundState {
    queue: VecDeque<Message>,
    in_flight: bool,
    closed: bool,
}

/// The outbound and inbound FIFO queues of a session. Each queue has its own
/// lock; the outbound queue also carries a wake signal for the sender worker
/// and an idle signal for callers that need to wait for it to catch up.
pub struct MessageQueues {
    outbound: Mutex<OutboundState>,
    outbound_ready: Condvar,
    outbound_idle: Condvar,
    inbound: Mutex<VecDeque<Message>>,
}

impl MessageQueues {
    pub fn new() -> Self {
        Self {
            outbound: Mutex::new(OutboundState {
                queue: VecDeque::new(),
                in_flight: false,
                closed: false,
            }),
            outbound_ready: Condvar::new(),
            outbound_idle: Condvar::new(),
            inbound: Mutex::new(VecDeque::new()),
        }
    }

    fn lock_outbound(&self) -> MutexGuard<'_, OutboundState> {
        self.outbound.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_inbound(&self) -> MutexGuard<'_, VecDeque<Message>> {
        self.inbound.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Outbound

    /// Push a message for the sender worker and wake it. Never blocks on the
    /// worker.
    pub fn enqueue_outbound(&self, message: Message) -> Result<(), QueueError> {
        {
            let mut outbound = self.lock_outbound();
            if outbound.closed {
                return Err(QueueError::Closed);
            }
            outbound.queue.push_back(message);
        }
        self.outbound_ready.notify_one();
        Ok(())
    }

    /// Blocks until a message is available or the queues are closed. A
    /// returned message is considered in flight until
    /// `mark_outbound_delivered` is called.
    pub fn drain_outbound_blocking(&self) -> OutboundItem {
        let mut outbound = self.lock_outbound();
        loop {
            if outbound.closed {
                outbound.in_flight = false;
                self.outbound_idle.notify_all();
                return OutboundItem::Shutdown;
            }
            if let Some(message) = outbound.queue.pop_front() {
                outbound.in_flight = true;
                return OutboundItem::Message(message);
            }
            outbound = self
                .outbound_ready
                .wait(outbound)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Called by the sender worker once the in-flight message is handed off
    pub fn mark_outbound_delivered(&self) {
        let mut outbound = self.lock_outbound();
        outbound.in_flight = false;
        if outbound.queue.is_empty() {
            self.outbound_idle.notify_all();
        }
    }

    /// Waits until the outbound queue is empty and nothing is in flight, or
    /// the queues are closed. Returns false if the timeout elapsed first.
    pub fn wait_outbound_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut outbound = self.lock_outbound();
        loop {
            if outbound.closed || (outbound.queue.is_empty() && !outbound.in_flight) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .outbound_idle
                .wait_timeout(outbound, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            outbound = guard;
        }
    }

    pub fn outbound_len(&self) -> usize {
        self.lock_outbound().queue.len()
    }

    // Inbound

    pub fn enqueue_inbound(&self, message: Message) -> Result<(), QueueError> {
        if self.is_closed() {
            return Err(QueueError::Closed);
        }
        self.lock_inbound().push_back(message);
        Ok(())
    }

    /// Takes every queued inbound message in insertion order without blocking
    pub fn drain_all_inbound(&self) -> Vec<Message> {
        let mut inbound = self.lock_inbound();
        Vec::from(mem::take(&mut *inbound))
    }

    pub fn inbound_len(&self) -> usize {
        self.lock_inbound().len()
    }

    // Lifecycle

    /// Stop accepting messages and wake every waiter. Idempotent.
    pub fn close(&self) {
        {
            let mut outbound = self.lock_outbound();
            outbound.closed = true;
        }
        self.outbound_ready.notify_all();
        self.outbound_idle.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock_outbound().closed
    }

    /// Discard everything still queued in both directions
    pub fn clear(&self) {
        self.lock_outbound().queue.clear();
        self.lock_inbound().clear();
    }
}

impl Default for MessageQueues {
    fn default() -> Self {
        Self::new()
    }
}
