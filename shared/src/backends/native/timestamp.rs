use std::time::SystemTime;

use thiserror::Error;

/// Error type for timestamp operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeError {
    /// System time is before UNIX epoch
    #[error("System time is before UNIX epoch")]
    SystemTimeBeforeEpoch,
}

/// Wall-clock source for message send times
pub struct Timestamp;

impl Timestamp {
    /// Returns the current time in milliseconds since UNIX epoch.
    ///
    /// # Errors
    /// Returns `TimeError::SystemTimeBeforeEpoch` if system time is before UNIX epoch.
    pub fn try_now_millis() -> Result<u64, TimeError> {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .map_err(|_| TimeError::SystemTimeBeforeEpoch)
    }

    /// Returns the current time in milliseconds since UNIX epoch, or 0 when
    /// the system clock is set before the epoch.
    pub fn now_millis() -> u64 {
        Self::try_now_millis().unwrap_or(0)
    }
}
