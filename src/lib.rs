//! Context-bridging I/O synchronization for embedded firmware
//!
//! A `no_std`, `no_alloc` toolkit for moving data between interrupt handlers
//! and tasks, usable both before a scheduler starts and under an RTOS.
//!
//! # Architecture
//!
//! The crate is organized into three components over a shared sync layer:
//!
//! 1. **Ring Buffer** ([`buffer`]): fixed-capacity byte FIFO over
//!    caller-owned storage, with a pluggable lock and completion signal
//! 2. **Transaction Engine** ([`engine`]): executes I2C-style transaction
//!    batches either polled (no scheduler) or interrupt-driven (scheduler
//!    running), resetting the peripheral after any timeout or fault
//! 3. **Streaming Consumer** ([`stream`]): drains a DMA-filled circular
//!    receive buffer without loss or duplication across wraparound
//!
//! The [`sync`] module defines the capability traits the components are
//! built on: [`Lock`], [`CompletionSignal`] and [`SchedulerProbe`]. The
//! firmware supplies RTOS-backed implementations; the crate ships
//! single-context, critical-section and spin-wait ones.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for public types and defmt logging
//! - `log`: Route internal diagnostics through the `log` facade
//!
//! # Example
//!
//! ```ignore
//! use ph_iosync::buffer::RingBuffer;
//! use ph_iosync::engine::{Instance, RegisterWidth, Transaction, TransactionEngine};
//! use ph_iosync::sync::{CriticalSectionCell, SchedulerFlag};
//!
//! static SCHEDULER: SchedulerFlag = SchedulerFlag::new();
//!
//! // UART RX buffer filled from the DMA consumer, drained by a task
//! let mut storage = [0u8; 256];
//! let rx = RingBuffer::new(&mut storage)?
//!     .with_lock::<CriticalSectionCell<_>>()
//!     .with_signals(&RX_DATA, &RX_SPACE);
//!
//! // I2C bus shared by sensor drivers
//! let engine = TransactionEngine::new(
//!     [Instance::new(i2c1, delay, &I2C1_DONE)],
//!     &SCHEDULER,
//! );
//! engine.init(0)?;
//!
//! let mut who_am_i = [0u8; 1];
//! engine.transfer(0, &mut [
//!     Transaction::read(0x68, &mut who_am_i).with_register(0x75, RegisterWidth::One),
//! ])?;
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// Must come first: the logging macros are textually scoped.
#[macro_use]
mod logging;

// =============================================================================
// Modules
// =============================================================================

pub mod buffer;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod stream;
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use buffer::RingBuffer;
pub use config::EngineConfig;
pub use engine::{
    AddressingMode, BusHardware, Diagnostics, EngineI2c, Instance, RegisterWidth,
    SequentialFrame, Transaction, TransactionEngine,
};
pub use error::{
    BufferError, BufferResult, ConfigError, ConfigResult, Error, ErrorKind, IoError, IoResult,
    Result,
};
pub use stream::{ByteSink, CircularDma, StreamConsumer, StreamCursor};
pub use sync::{CompletionSignal, ExecutionMode, Lock, SchedulerProbe};
