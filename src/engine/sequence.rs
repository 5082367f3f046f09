//! Batch validation.
//!
//! Everything here runs before the instance lock is taken, so a rejected
//! batch never touches the hardware.

use super::descriptor::{AddressingMode, SequentialFrame, Transaction};
use crate::constants::MAX_7BIT_ADDRESS;
use crate::error::{ConfigError, ConfigResult};

/// Tracks whether a sequential session is open while walking a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SessionTracker {
    open: bool,
}

impl SessionTracker {
    /// Feed the next descriptor's addressing mode.
    pub(crate) fn step(&mut self, mode: AddressingMode) -> ConfigResult<()> {
        match mode {
            AddressingMode::Normal
            | AddressingMode::Memory { .. }
            | AddressingMode::Sequential(SequentialFrame::FirstAndLast) => {
                if self.open {
                    return Err(ConfigError::InvalidSequence);
                }
            }
            AddressingMode::Sequential(SequentialFrame::First | SequentialFrame::FirstAndNext) => {
                if self.open {
                    return Err(ConfigError::InvalidSequence);
                }
                self.open = true;
            }
            AddressingMode::Sequential(SequentialFrame::Next) => {
                if !self.open {
                    return Err(ConfigError::InvalidSequence);
                }
            }
            AddressingMode::Sequential(SequentialFrame::Last) => {
                if !self.open {
                    return Err(ConfigError::InvalidSequence);
                }
                self.open = false;
            }
        }
        Ok(())
    }

    /// Check that no session is left open.
    pub(crate) fn finish(self) -> ConfigResult<()> {
        if self.open {
            Err(ConfigError::InvalidSequence)
        } else {
            Ok(())
        }
    }
}

/// Validate a target address.
pub(crate) fn check_address(address: u8) -> ConfigResult<()> {
    if address > MAX_7BIT_ADDRESS {
        return Err(ConfigError::InvalidAddress);
    }
    Ok(())
}

/// Validate one descriptor on its own.
pub(crate) fn check_descriptor(txn: &Transaction<'_>) -> ConfigResult<()> {
    check_address(txn.address)?;
    if txn.data.is_empty() {
        return Err(ConfigError::EmptyBuffer);
    }
    if let AddressingMode::Memory { register, width } = txn.mode {
        if !width.fits(register) {
            return Err(ConfigError::InvalidRegisterWidth);
        }
    }
    Ok(())
}

/// Validate a whole batch.
pub(crate) fn validate(batch: &[Transaction<'_>]) -> ConfigResult<()> {
    if batch.is_empty() {
        return Err(ConfigError::EmptyBatch);
    }
    let mut session = SessionTracker::default();
    for txn in batch {
        check_descriptor(txn)?;
        session.step(txn.mode)?;
    }
    session.finish()
}
