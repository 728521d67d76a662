use std::{
    sync::{
        atomic::{AtomicU32, AtomicU64, Ordering},
        Mutex, PoisonError,
    },
    time::{Duration, Instant},
};

use crate::BandwidthMonitor;

/// Point-in-time view of a session's statistics
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NetworkStats {
    pub out_bytes_per_sec: f32,
    pub in_bytes_per_sec: f32,
    pub latency_ms: f32,
    pub packet_loss_percent: f32,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Running statistics of a session. Counters are atomics since they are
/// written by several workers without a dedicated lock.
pub struct SessionStats {
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    messages_sent: AtomicU64,
    messages_dropped: AtomicU64,
    latency_ms_bits: AtomicU32,
    outgoing: Mutex<BandwidthMonitor>,
    incoming: Mutex<BandwidthMonitor>,
}

impl SessionStats {
    pub fn new(bandwidth_measure_duration: Duration) -> Self {
        Self {
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            messages_sent: AtomicU64::new(0),
            messages_dropped: AtomicU64::new(0),
            latency_ms_bits: AtomicU32::new(0f32.to_bits()),
            outgoing: Mutex::new(BandwidthMonitor::new(bandwidth_measure_duration)),
            incoming: Mutex::new(BandwidthMonitor::new(bandwidth_measure_duration)),
        }
    }

    pub fn record_sent(&self, bytes: usize) {
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.outgoing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(Instant::now(), bytes);
    }

    pub fn record_received(&self, bytes: usize) {
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
        self.incoming
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(Instant::now(), bytes);
    }

    /// Count a message lost to the simulated link
    pub fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_latency_ms(&self, latency_ms: f32) {
        self.latency_ms_bits
            .store(latency_ms.to_bits(), Ordering::Relaxed);
    }

    pub fn latency_ms(&self) -> f32 {
        f32::from_bits(self.latency_ms_bits.load(Ordering::Relaxed))
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn messages_dropped(&self) -> u64 {
        self.messages_dropped.load(Ordering::Relaxed)
    }

    /// Share of outbound messages lost, in percent
    pub fn packet_loss_percent(&self) -> f32 {
        let dropped = self.messages_dropped();
        let attempted = self.messages_sent() + dropped;
        if attempted == 0 {
            return 0.0;
        }
        (dropped as f64 / attempted as f64 * 100.0) as f32
    }

    pub fn out_bytes_per_sec(&self) -> f32 {
        self.outgoing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bytes_per_sec(Instant::now())
    }

    pub fn in_bytes_per_sec(&self) -> f32 {
        self.incoming
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bytes_per_sec(Instant::now())
    }

    pub fn snapshot(&self) -> NetworkStats {
        NetworkStats {
            out_bytes_per_sec: self.out_bytes_per_sec(),
            in_bytes_per_sec: self.in_bytes_per_sec(),
            latency_ms: self.latency_ms(),
            packet_loss_percent: self.packet_loss_percent(),
            bytes_sent: self.bytes_sent(),
            bytes_received: self.bytes_received(),
        }
    }
}
