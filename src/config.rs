//! Configuration types for the transaction engine

use crate::constants::{DEFAULT_POLL_INTERVAL_US, DEFAULT_TRANSFER_TIMEOUT_MS};

/// Transaction engine configuration
///
/// Applies to every instance in an engine. Individual descriptors may
/// still override the timeout.
///
/// # Example
///
/// ```
/// use ph_iosync::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_default_timeout_ms(25)
///     .with_poll_interval_us(50);
/// assert_eq!(config.default_timeout_ms, 25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Timeout applied to descriptors that do not carry their own (ms)
    pub default_timeout_ms: u32,
    /// Delay between status polls on the polled path (µs)
    pub poll_interval_us: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TRANSFER_TIMEOUT_MS,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
        }
    }

    /// Set the default transfer timeout
    ///
    /// A value of zero falls back to [`DEFAULT_TRANSFER_TIMEOUT_MS`].
    #[must_use]
    pub const fn with_default_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.default_timeout_ms = if timeout_ms == 0 {
            DEFAULT_TRANSFER_TIMEOUT_MS
        } else {
            timeout_ms
        };
        self
    }

    /// Set the polling interval
    ///
    /// Clamped to at least 1 µs so the polling budget stays finite.
    #[must_use]
    pub const fn with_poll_interval_us(mut self, interval_us: u32) -> Self {
        self.poll_interval_us = if interval_us == 0 { 1 } else { interval_us };
        self
    }

    /// Number of status polls that fit in `timeout_ms`
    ///
    /// Always at least one, so a zero timeout still samples the status once.
    #[must_use]
    pub const fn poll_budget(&self, timeout_ms: u32) -> u32 {
        let total_us = (timeout_ms as u64) * 1000;
        let polls = total_us / (self.poll_interval_us as u64);
        if polls == 0 {
            1
        } else if polls > u32::MAX as u64 {
            u32::MAX
        } else {
            polls as u32
        }
    }
}
