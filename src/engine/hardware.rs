//! Hardware accessor boundary.
//!
//! The engine drives a peripheral instance only through [`BusHardware`].
//! Implementations wrap the vendor HAL (or registers) of one bus instance.

use super::descriptor::{AddressingMode, Direction};
use crate::error::IoResult;
use crate::sync::ExecutionMode;

/// Data of a single dispatched transfer.
#[derive(Debug)]
pub enum Payload<'r> {
    /// Storage for received bytes
    Read(&'r mut [u8]),
    /// Bytes to send
    Write(&'r [u8]),
}

impl Payload<'_> {
    /// Transfer direction
    #[inline]
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Payload::Read(_) => Direction::Read,
            Payload::Write(_) => Direction::Write,
        }
    }

    /// Number of bytes to move
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Payload::Read(buf) => buf.len(),
            Payload::Write(buf) => buf.len(),
        }
    }

    /// Whether there is nothing to move
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One transfer as handed to the hardware.
#[derive(Debug)]
pub struct Request<'r> {
    /// 7-bit target address
    pub address: u8,
    /// Addressing mode (controls register prefix and START/STOP framing)
    pub mode: AddressingMode,
    /// Data to move
    pub payload: Payload<'r>,
}

impl Request<'_> {
    /// Transfer direction
    #[inline]
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.payload.direction()
    }
}

/// Progress of the transfer in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusStatus {
    /// Still running
    Busy,
    /// Finished successfully; read data (if any) is in the request buffer
    Complete,
    /// NACK, bus error or arbitration loss
    Fault,
}

/// Access to one bus peripheral instance.
///
/// # Contract
///
/// - `start` begins the transfer described by the request. In
///   [`ExecutionMode::Interrupt`] the peripheral's interrupt handler must
///   call [`TransactionEngine::on_transfer_complete`] or
///   [`TransactionEngine::on_transfer_error`] when the transfer ends.
/// - `status` reports progress. On the polled path it is called repeatedly
///   and may move data between the peripheral and the request buffer.
/// - `disable`, `force_ready` and `enable` are the reset sequence used after
///   a timeout or fault. They must not fail.
/// - A [`Sequential`](super::AddressingMode::Sequential) `Next` or `Last`
///   frame whose direction differs from the previous frame of the session
///   must be sent with a repeated START and the target address, even
///   though the frame itself does not announce one. [`EngineI2c`] relies
///   on this for operation lists such as write, write, read.
///
/// [`EngineI2c`]: super::EngineI2c
/// [`TransactionEngine::on_transfer_complete`]: super::TransactionEngine::on_transfer_complete
/// [`TransactionEngine::on_transfer_error`]: super::TransactionEngine::on_transfer_error
pub trait BusHardware {
    /// Bring the peripheral up (clocks, pins, timing).
    ///
    /// # Errors
    ///
    /// Returns an error if the peripheral could not be initialized.
    fn init(&mut self) -> IoResult<()>;

    /// Begin a transfer.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::HardwareFault`](crate::IoError::HardwareFault) if
    /// the peripheral refused to start (busy or in an error state).
    fn start(&mut self, request: &mut Request<'_>, mode: ExecutionMode) -> IoResult<()>;

    /// Report progress of the transfer started last.
    fn status(&mut self, request: &mut Request<'_>) -> BusStatus;

    /// Disable the peripheral, aborting any transfer.
    fn disable(&mut self);

    /// Force the peripheral's state machine back to ready.
    fn force_ready(&mut self);

    /// Re-enable the peripheral.
    fn enable(&mut self);
}

impl<H: BusHardware + ?Sized> BusHardware for &mut H {
    fn init(&mut self) -> IoResult<()> {
        (**self).init()
    }

    fn start(&mut self, request: &mut Request<'_>, mode: ExecutionMode) -> IoResult<()> {
        (**self).start(request, mode)
    }

    fn status(&mut self, request: &mut Request<'_>) -> BusStatus {
        (**self).status(request)
    }

    fn disable(&mut self) {
        (**self).disable();
    }

    fn force_ready(&mut self) {
        (**self).force_ready();
    }

    fn enable(&mut self) {
        (**self).enable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_reports_direction_and_len() {
        let mut rx = [0u8; 3];
        let payload = Payload::Read(&mut rx);
        assert_eq!(payload.direction(), Direction::Read);
        assert_eq!(payload.len(), 3);

        let payload = Payload::Write(&[1, 2]);
        assert_eq!(payload.direction(), Direction::Write);
        assert!(!payload.is_empty());
    }

    #[test]
    fn request_direction_follows_payload() {
        let request = Request {
            address: 0x1E,
            mode: AddressingMode::Normal,
            payload: Payload::Write(&[0x00]),
        };
        assert_eq!(request.direction(), Direction::Write);
    }
}
