use std::sync::{Mutex, PoisonError};

use crate::Message;

/// Simulated network conditions: latency with jitter and a loss probability
#[derive(Clone, Debug, PartialEq)]
pub struct LinkConditionerConfig {
    /// Base latency in milliseconds
    pub incoming_latency: u32,
    /// Maximum deviation from the base latency in milliseconds
    pub incoming_jitter: u32,
    /// Probability in [0, 1] that an unreliable message is lost
    pub incoming_loss: f32,
    /// Seed for the random source, for reproducible runs
    pub seed: Option<u64>,
}

impl LinkConditionerConfig {
    pub fn new(incoming_latency: u32, incoming_jitter: u32, incoming_loss: f32) -> Self {
        Self {
            incoming_latency,
            incoming_jitter,
            incoming_loss,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn perfect_condition() -> Self {
        Self::new(1, 0, 0.0)
    }

    pub fn good_condition() -> Self {
        Self::new(40, 10, 0.002)
    }

    pub fn average_condition() -> Self {
        Self::new(100, 25, 0.02)
    }

    pub fn poor_condition() -> Self {
        Self::new(200, 50, 0.04)
    }
}

/// Source of simulated latency and loss, consulted by the session workers
pub trait LinkConditioner: Send + Sync {
    /// Latency estimate to report for the next probe, in milliseconds
    fn sample_latency_ms(&self) -> f32;
    /// Whether `message` should be treated as lost in transit
    fn should_drop(&self, message: &Message) -> bool;
}

/// A link without latency or loss
pub struct PerfectLink;

impl LinkConditioner for PerfectLink {
    fn sample_latency_ms(&self) -> f32 {
        0.0
    }

    fn should_drop(&self, _message: &Message) -> bool {
        false
    }
}

/// A link whose latency and loss are drawn from a random source configured
/// by a `LinkConditionerConfig`
pub struct ConditionedLink {
    config: LinkConditionerConfig,
    rng: Mutex<fastrand::Rng>,
}

impl ConditionedLink {
    pub fn new(config: LinkConditionerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &LinkConditionerConfig {
        &self.config
    }
}

impl LinkConditioner for ConditionedLink {
    fn sample_latency_ms(&self) -> f32 {
        let jitter = self.config.incoming_jitter;
        let offset = {
            let rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            rng.u32(0..=jitter.saturating_mul(2))
        };
        let latency = i64::from(self.config.incoming_latency) + i64::from(offset) - i64::from(jitter);
        latency.max(0) as f32
    }

    fn should_drop(&self, _message: &Message) -> bool {
        if self.config.incoming_loss <= 0.0 {
            return false;
        }
        let rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.f32() < self.config.incoming_loss
    }
}
