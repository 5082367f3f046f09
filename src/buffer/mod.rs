//! Byte buffers shared between interrupt and task context.
//!
//! [`RingBuffer`] is a fixed-capacity FIFO over caller-owned storage. Its
//! locking and blocking behavior are chosen by type parameters, so the
//! same buffer code runs bare-metal, under an RTOS, or in host tests.

mod ring;

pub use ring::{RingBuffer, RingState};
