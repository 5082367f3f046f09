//! Error types for the I/O synchronization layer
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Invalid arguments rejected before any hardware access
//! - [`BufferError`]: Ring buffer push/pop expiry
//! - [`IoError`]: Runtime transfer failures (these trigger an instance reset)
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most operations. [`Error::kind`] collapses it to the five caller-visible
//! failure kinds.

// =============================================================================
// Configuration / Argument Errors
// =============================================================================

/// Argument and configuration errors
///
/// These are always detected before any hardware is touched, so the
/// instance or buffer is left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Ring buffer or stream storage has zero capacity
    ZeroCapacity,
    /// Transaction batch contains no descriptors
    EmptyBatch,
    /// Transaction descriptor has a zero-length data buffer
    EmptyBuffer,
    /// Instance index is outside the engine's registry
    InvalidInstance,
    /// Device address does not fit in 7 bits
    InvalidAddress,
    /// Register address does not fit the declared register width
    InvalidRegisterWidth,
    /// Sequential frames do not form a valid open/continue/close session
    InvalidSequence,
    /// Hardware cursor reported more remaining bytes than the buffer holds
    InvalidCursor,
    /// Peripheral initialization failed
    InitFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::ZeroCapacity => "zero capacity",
            ConfigError::EmptyBatch => "empty transaction batch",
            ConfigError::EmptyBuffer => "zero-length data buffer",
            ConfigError::InvalidInstance => "instance out of range",
            ConfigError::InvalidAddress => "invalid device address",
            ConfigError::InvalidRegisterWidth => "register address exceeds width",
            ConfigError::InvalidSequence => "invalid sequential frame order",
            ConfigError::InvalidCursor => "hardware cursor out of range",
            ConfigError::InitFailed => "peripheral initialization failed",
        }
    }
}

// =============================================================================
// Buffer Errors
// =============================================================================

/// Ring buffer errors
///
/// Returned when a push or pop could not complete within its timeout.
/// The buffer remains valid and its offsets are unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// No free space appeared before the timeout expired
    Full,
    /// No data appeared before the timeout expired
    Empty,
}

impl core::fmt::Display for BufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BufferError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            BufferError::Full => "buffer full",
            BufferError::Empty => "buffer empty",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime transfer errors
///
/// Either of these leaves the peripheral instance reset and ready for the
/// next call; the failed transaction itself is not resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Transfer did not complete within its timeout
    Timeout,
    /// Peripheral reported NACK, bus error or arbitration loss
    HardwareFault,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::HardwareFault => "hardware fault",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// Caller-visible failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Rejected before dispatch, no side effects
    InvalidArgument,
    /// Wait exceeded its bound; the instance was reset
    Timeout,
    /// Status-flag error; the instance was reset
    HardwareFault,
    /// Push timed out on a full buffer
    BufferFull,
    /// Pop timed out on an empty buffer
    BufferEmpty,
}

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::InvalidSequence)) => { /* ... */ }
///     Err(Error::Buffer(BufferError::Full)) => { /* ... */ }
///     Err(Error::Io(IoError::Timeout)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Argument or configuration error
    Config(ConfigError),
    /// Ring buffer error
    Buffer(BufferError),
    /// Transfer error
    Io(IoError),
}

impl Error {
    /// Collapse into the caller-visible failure kind
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::InvalidArgument,
            Error::Buffer(BufferError::Full) => ErrorKind::BufferFull,
            Error::Buffer(BufferError::Empty) => ErrorKind::BufferEmpty,
            Error::Io(IoError::Timeout) => ErrorKind::Timeout,
            Error::Io(IoError::HardwareFault) => ErrorKind::HardwareFault,
        }
    }

    /// Returns a human-readable description of the inner error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Error::Config(e) => e.as_str(),
            Error::Buffer(e) => e.as_str(),
            Error::Io(e) => e.as_str(),
        }
    }

    /// Whether this error caused (or would cause) an instance reset
    #[must_use]
    pub const fn is_recovered_by_reset(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Buffer(e) => write!(f, "buffer: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl core::error::Error for Error {}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<BufferError> for Error {
    fn from(e: BufferError) -> Self {
        Error::Buffer(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            Error::Io(IoError::HardwareFault) => embedded_hal::i2c::ErrorKind::Bus,
            _ => embedded_hal::i2c::ErrorKind::Other,
        }
    }
}

/// Result type alias for crate operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for argument validation
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for ring buffer operations
pub type BufferResult<T> = core::result::Result<T, BufferError>;

/// Result type alias for transfer operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
