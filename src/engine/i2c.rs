//! `embedded-hal` I2C adapter.
//!
//! Lets drivers written against [`embedded_hal::i2c::I2c`] share an
//! engine instance with code using native transaction batches.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

use super::descriptor::{AddressingMode, SequentialFrame};
use super::engine::{Bus, TransactionEngine};
use super::hardware::{BusHardware, Payload, Request};
use super::sequence;
use crate::error::{ConfigError, Error};
use crate::sync::{CompletionSignal, Lock, SchedulerProbe};

/// One engine instance seen as an `embedded-hal` I2C bus.
///
/// The operations of a [`transaction`](I2c::transaction) run as a single
/// sequential session under one lock acquisition, with a repeated START
/// only where the direction changes.
pub struct EngineI2c<'e, H, D, L, S, P, const N: usize> {
    engine: &'e TransactionEngine<H, D, L, S, P, N>,
    id: usize,
}

impl<'e, H, D, L, S, P, const N: usize> EngineI2c<'e, H, D, L, S, P, N>
where
    H: BusHardware,
    D: DelayNs,
    L: Lock<Bus<H, D>>,
    S: CompletionSignal,
    P: SchedulerProbe,
{
    /// Bind to instance `id` of `engine`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInstance`] if `id` is out of range.
    pub fn new(engine: &'e TransactionEngine<H, D, L, S, P, N>, id: usize) -> Result<Self, Error> {
        if id >= N {
            return Err(ConfigError::InvalidInstance.into());
        }
        Ok(Self { engine, id })
    }

    /// Instance this adapter drives
    #[must_use]
    pub fn instance(&self) -> usize {
        self.id
    }
}

impl<H, D, L, S, P, const N: usize> core::fmt::Debug for EngineI2c<'_, H, D, L, S, P, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineI2c").field("id", &self.id).finish()
    }
}

fn is_read(op: &Operation<'_>) -> bool {
    matches!(op, Operation::Read(_))
}

/// Sequential frame for operation `index` of `operations`.
fn frame_for(operations: &[Operation<'_>], index: usize) -> SequentialFrame {
    let last = operations.len() - 1;
    if last == 0 {
        SequentialFrame::FirstAndLast
    } else if index == 0 {
        if is_read(&operations[0]) == is_read(&operations[1]) {
            SequentialFrame::FirstAndNext
        } else {
            SequentialFrame::First
        }
    } else if index == last {
        SequentialFrame::Last
    } else {
        SequentialFrame::Next
    }
}

impl<H, D, L, S, P, const N: usize> ErrorType for EngineI2c<'_, H, D, L, S, P, N> {
    type Error = Error;
}

impl<H, D, L, S, P, const N: usize> I2c<SevenBitAddress> for EngineI2c<'_, H, D, L, S, P, N>
where
    H: BusHardware,
    D: DelayNs,
    L: Lock<Bus<H, D>>,
    S: CompletionSignal,
    P: SchedulerProbe,
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations.is_empty() {
            return Err(ConfigError::EmptyBatch.into());
        }
        sequence::check_address(address)?;
        let empty = operations.iter().any(|op| match op {
            Operation::Read(buf) => buf.is_empty(),
            Operation::Write(buf) => buf.is_empty(),
        });
        if empty {
            return Err(ConfigError::EmptyBuffer.into());
        }

        let timeout_ms = self.engine.config().default_timeout_ms;
        let mode = self.engine.current_mode();
        self.engine.with_session(self.id, mode, |session| {
            for index in 0..operations.len() {
                let frame = frame_for(operations, index);
                let payload = match &mut operations[index] {
                    Operation::Read(buf) => Payload::Read(&mut buf[..]),
                    Operation::Write(buf) => Payload::Write(&buf[..]),
                };
                let mut request = Request {
                    address,
                    mode: AddressingMode::Sequential(frame),
                    payload,
                };
                session.run(&mut request, timeout_ms)?;
            }
            Ok(())
        })
    }
}
