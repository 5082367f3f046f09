//! Synchronization and Concurrency Support
//!
//! Capability traits injected into the ring buffer, transaction engine and
//! stream consumer, plus the implementations this crate ships:
//!
//! - **Locks** (`lock`): [`Lock`] with [`NoLock`] and [`CriticalSectionCell`]
//! - **Signals** (`signal`): [`CompletionSignal`] with [`NoSignal`] and
//!   [`SpinSignal`]
//! - **Scheduler** (`scheduler`): [`SchedulerProbe`] selecting the
//!   [`ExecutionMode`] of each transfer
//!
//! RTOS ports supply their own mutex and binary-semaphore implementations
//! of [`Lock`] and [`CompletionSignal`].
//!
//! # Example
//!
//! ```ignore
//! use ph_iosync::sync::{CompletionSignal, SpinSignal};
//!
//! static RX_READY: SpinSignal = SpinSignal::new();
//!
//! #[interrupt]
//! fn DMA1_CH3() {
//!     RX_READY.set();
//! }
//!
//! fn main_loop() {
//!     if RX_READY.wait(5) {
//!         // drain
//!     }
//! }
//! ```

mod lock;
mod primitives;
mod scheduler;
mod signal;

pub use lock::{Lock, NoLock};
pub use primitives::CriticalSectionCell;
pub use scheduler::{ExecutionMode, FnProbe, NoScheduler, SchedulerFlag, SchedulerProbe};
pub use signal::{CompletionSignal, NoSignal, SpinSignal};
