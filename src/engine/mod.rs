//! Transaction Engine
//!
//! Executes batches of bus transactions (I2C-style: address, optional
//! register, data) against peripheral instances, either by polling or by
//! waiting for the peripheral's completion interrupt.
//!
//! # Module Structure
//!
//! - `descriptor`: [`Transaction`] and its addressing modes
//! - `sequence`: batch validation (addresses, buffers, session framing)
//! - `hardware`: the [`BusHardware`] boundary implemented per peripheral
//! - `engine`: [`TransactionEngine`], per-instance locking and recovery
//! - `i2c`: [`EngineI2c`], the `embedded-hal` adapter
//!
//! # Interrupt Wiring
//!
//! ```ignore
//! #[interrupt]
//! fn I2C1_EV() {
//!     if i2c1_transfer_done() {
//!         ENGINE.on_transfer_complete(0);
//!     }
//! }
//!
//! #[interrupt]
//! fn I2C1_ER() {
//!     ENGINE.on_transfer_error(0);
//! }
//! ```

mod descriptor;
#[allow(clippy::module_inception)]
mod engine;
mod hardware;
mod i2c;
mod sequence;

pub use descriptor::{
    AddressingMode, Direction, Prepare, RegisterWidth, SequentialFrame, Transaction,
};
pub use engine::{Bus, Diagnostics, Instance, TransactionEngine};
pub use hardware::{BusHardware, BusStatus, Payload, Request};
pub use i2c::EngineI2c;
