//! Centralized Constants
//!
//! Single source of truth for the defaults and limits used by the ring
//! buffer, the transaction engine and the stream consumer.
//!
//! # Organization
//!
//! - **Timing**: transfer timeouts, polling intervals, spin budgets
//! - **Bus limits**: addressing ranges
//! - **Buffer sizes**: default DMA receive ring size

// =============================================================================
// Timing Constants
// =============================================================================

/// Transfer timeout used when a descriptor does not set one (milliseconds)
pub const DEFAULT_TRANSFER_TIMEOUT_MS: u32 = 10;

/// Interval between status polls on the polled (no-scheduler) path (microseconds)
pub const DEFAULT_POLL_INTERVAL_US: u32 = 10;

/// Spin iterations treated as one millisecond by [`SpinSignal`](crate::sync::SpinSignal)
///
/// Tuned for a core clock in the tens of MHz; boards running much faster
/// should construct the signal with their own budget.
pub const DEFAULT_SPINS_PER_MS: u32 = 4_000;

/// Timeout value meaning "do not wait at all"
pub const NO_WAIT: u32 = 0;

/// Timeout value meaning "wait forever"
pub const WAIT_FOREVER: u32 = u32::MAX;

// =============================================================================
// Bus Limits
// =============================================================================

/// Largest 7-bit device address
pub const MAX_7BIT_ADDRESS: u8 = 0x7F;

/// Largest register address for one-byte register addressing
pub const MAX_8BIT_REGISTER: u16 = 0xFF;

// =============================================================================
// Buffer Sizes
// =============================================================================

/// Default size of a circular DMA receive buffer (bytes)
pub const DEFAULT_DMA_RX_BUFFER_SIZE: usize = 512;
