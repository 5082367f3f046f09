//! Streaming consumer for hardware-filled circular buffers
//!
//! A UART receiver fed by a DMA channel in circular mode never stops: the
//! consumer only learns how far the hardware has written and must forward
//! each byte exactly once, including across the wrap from the end of the
//! buffer back to the start.
//!
//! - [`StreamCursor`]: the pure position-tracking algorithm
//! - [`StreamConsumer`]: a cursor bound to a [`CircularDma`] channel
//! - [`on_rx_interrupt`]: interrupt-side wakeup for half-transfer,
//!   transfer-complete and line-idle events

mod consumer;
mod cursor;
mod sink;

pub use consumer::{CircularDma, RxEvents, StreamConsumer, on_rx_interrupt};
pub use cursor::{Segments, StreamCursor};
pub use sink::ByteSink;
