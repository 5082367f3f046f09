//! Transaction descriptors.
//!
//! A [`Transaction`] describes one bus transfer: who to talk to, how the
//! target is addressed, and the caller-owned buffer to move data through.
//! Descriptors are grouped into batches that the engine executes under a
//! single lock acquisition.

use crate::constants::MAX_8BIT_REGISTER;
use crate::error::{ConfigError, ConfigResult};

/// Transfer direction, from the controller's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Target to controller
    Read,
    /// Controller to target
    Write,
}

/// Width of a register (memory) address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterWidth {
    /// 8-bit register address
    #[default]
    One,
    /// 16-bit register address, sent most significant byte first
    Two,
}

impl RegisterWidth {
    /// Number of address bytes on the wire
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            RegisterWidth::One => 1,
            RegisterWidth::Two => 2,
        }
    }

    /// Whether `register` can be expressed in this width
    #[must_use]
    pub const fn fits(self, register: u16) -> bool {
        match self {
            RegisterWidth::One => register <= MAX_8BIT_REGISTER,
            RegisterWidth::Two => true,
        }
    }
}

impl TryFrom<u8> for RegisterWidth {
    type Error = ConfigError;

    fn try_from(bytes: u8) -> ConfigResult<Self> {
        match bytes {
            1 => Ok(RegisterWidth::One),
            2 => Ok(RegisterWidth::Two),
            _ => Err(ConfigError::InvalidRegisterWidth),
        }
    }
}

/// Framing of one part of a multi-descriptor bus session.
///
/// A session is a run of frames with no STOP condition between them, so
/// the target sees one uninterrupted conversation (e.g. write a command,
/// then read the response with a repeated START).
///
/// | Frame          | START | STOP | Session      |
/// |----------------|-------|------|--------------|
/// | `First`        | yes   | no   | opens        |
/// | `FirstAndNext` | yes   | no   | opens        |
/// | `Next`         | no    | no   | continues    |
/// | `FirstAndLast` | yes   | yes  | self-contained |
/// | `Last`         | no    | yes  | closes       |
///
/// `First` announces that the direction changes in the next frame
/// (repeated START follows); `FirstAndNext` announces the same direction
/// continues without a new START. A `Next` or `Last` frame that changes
/// direction still gets a repeated START from the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequentialFrame {
    /// Opening frame, direction changes next
    First,
    /// Opening frame, same direction continues
    FirstAndNext,
    /// Continuation frame
    Next,
    /// Complete frame with START and STOP
    FirstAndLast,
    /// Closing frame
    Last,
}

impl SequentialFrame {
    /// Whether this frame starts a new session
    #[must_use]
    pub const fn opens_session(self) -> bool {
        matches!(self, SequentialFrame::First | SequentialFrame::FirstAndNext)
    }

    /// Whether this frame ends with a STOP condition
    #[must_use]
    pub const fn closes_session(self) -> bool {
        matches!(self, SequentialFrame::FirstAndLast | SequentialFrame::Last)
    }

    /// Whether this frame begins with a START condition
    #[must_use]
    pub const fn generates_start(self) -> bool {
        matches!(
            self,
            SequentialFrame::First | SequentialFrame::FirstAndNext | SequentialFrame::FirstAndLast
        )
    }
}

/// How the target is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressingMode {
    /// Plain transfer: START, address, data, STOP
    Normal,
    /// Register access: the register address is sent before the data
    Memory {
        /// Register address
        register: u16,
        /// Register address width
        width: RegisterWidth,
    },
    /// One frame of a multi-descriptor session
    Sequential(SequentialFrame),
}

/// Callback run immediately before its descriptor is dispatched.
///
/// Receives the descriptors of the batch that have already completed
/// (including their read data) and the buffer of the descriptor about to
/// run, so a write can be computed from an earlier read within one lock
/// acquisition.
pub type Prepare<'b> = dyn FnMut(&[Transaction<'b>], &mut [u8]) + 'b;

/// One transfer against a single target.
pub struct Transaction<'b> {
    /// 7-bit target address
    pub address: u8,
    /// Transfer direction
    pub direction: Direction,
    /// Addressing mode
    pub mode: AddressingMode,
    /// Data to send, or storage for received data
    pub data: &'b mut [u8],
    /// Per-descriptor timeout; the engine default applies when unset
    pub timeout_ms: Option<u32>,
    pub(crate) prepare: Option<&'b mut Prepare<'b>>,
}

impl<'b> Transaction<'b> {
    /// Read `data.len()` bytes from `address`.
    pub fn read(address: u8, data: &'b mut [u8]) -> Self {
        Self::new(address, Direction::Read, data)
    }

    /// Write `data` to `address`.
    pub fn write(address: u8, data: &'b mut [u8]) -> Self {
        Self::new(address, Direction::Write, data)
    }

    fn new(address: u8, direction: Direction, data: &'b mut [u8]) -> Self {
        Self {
            address,
            direction,
            mode: AddressingMode::Normal,
            data,
            timeout_ms: None,
            prepare: None,
        }
    }

    /// Address a register inside the target.
    #[must_use]
    pub fn with_register(mut self, register: u16, width: RegisterWidth) -> Self {
        self.mode = AddressingMode::Memory { register, width };
        self
    }

    /// Make this descriptor one frame of a multi-descriptor session.
    #[must_use]
    pub fn with_sequential(mut self, frame: SequentialFrame) -> Self {
        self.mode = AddressingMode::Sequential(frame);
        self
    }

    /// Override the engine's default timeout.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Attach a pre-dispatch callback.
    #[must_use]
    pub fn with_prepare(mut self, prepare: &'b mut Prepare<'b>) -> Self {
        self.prepare = Some(prepare);
        self
    }

    /// Data length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the data buffer is empty (never valid for dispatch)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl core::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transaction")
            .field("address", &self.address)
            .field("direction", &self.direction)
            .field("mode", &self.mode)
            .field("len", &self.data.len())
            .field("timeout_ms", &self.timeout_ms)
            .field("prepare", &self.prepare.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_width_from_byte_count() {
        assert_eq!(RegisterWidth::try_from(1), Ok(RegisterWidth::One));
        assert_eq!(RegisterWidth::try_from(2), Ok(RegisterWidth::Two));
        assert_eq!(
            RegisterWidth::try_from(3),
            Err(ConfigError::InvalidRegisterWidth)
        );
        assert_eq!(RegisterWidth::Two.bytes(), 2);
    }

    #[test]
    fn register_width_fits() {
        assert!(RegisterWidth::One.fits(0xFF));
        assert!(!RegisterWidth::One.fits(0x100));
        assert!(RegisterWidth::Two.fits(0xFFFF));
    }

    #[test]
    fn frame_session_markers() {
        use SequentialFrame::*;

        assert!(First.opens_session() && !First.closes_session());
        assert!(FirstAndNext.opens_session() && !FirstAndNext.closes_session());
        assert!(!Next.opens_session() && !Next.closes_session());
        assert!(!FirstAndLast.opens_session() && FirstAndLast.closes_session());
        assert!(!Last.opens_session() && Last.closes_session());

        assert!(FirstAndLast.generates_start());
        assert!(!Next.generates_start());
        assert!(!Last.generates_start());
    }

    #[test]
    fn builders_set_fields() {
        let mut data = [0u8; 4];
        let txn = Transaction::read(0x68, &mut data)
            .with_register(0x3B, RegisterWidth::One)
            .with_timeout_ms(25);
        assert_eq!(txn.direction, Direction::Read);
        assert_eq!(
            txn.mode,
            AddressingMode::Memory {
                register: 0x3B,
                width: RegisterWidth::One
            }
        );
        assert_eq!(txn.timeout_ms, Some(25));
        assert_eq!(txn.len(), 4);
        assert!(txn.prepare.is_none());
    }

    #[test]
    fn with_prepare_attaches_callback() {
        let mut data = [0u8; 1];
        let mut calls = 0;
        let prepare: &mut Prepare<'_> = &mut |_, buf| {
            buf[0] = 0xAA;
            calls += 1;
        };
        let mut txn = Transaction::write(0x10, &mut data).with_prepare(prepare);
        if let Some(prepare) = txn.prepare.as_deref_mut() {
            prepare(&[], &mut *txn.data);
        }
        assert_eq!(txn.data[0], 0xAA);
        drop(txn);
        assert_eq!(calls, 1);
    }
}
