//! Testing utilities and mock implementations
//!
//! Host-side doubles for the hardware, locking and signalling traits, so
//! buffer, engine and stream logic can be exercised with `cargo test`.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::boxed::Box;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use std::vec;
use std::vec::Vec;

use crate::constants::WAIT_FOREVER;
use crate::engine::{AddressingMode, BusHardware, BusStatus, Direction, Payload, Request};
use crate::error::{IoError, IoResult};
use crate::stream::CircularDma;
use crate::sync::{CompletionSignal, ExecutionMode, Lock};

// =============================================================================
// Locks and Signals
// =============================================================================

/// Lock backed by `std::sync::Mutex`, standing in for an RTOS mutex
#[derive(Debug, Default)]
pub struct StdLock<T>(Mutex<T>);

impl<T> Lock<T> for StdLock<T> {
    fn new(value: T) -> Self {
        Self(Mutex::new(value))
    }

    fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

/// Binary semaphore built from a mutex and condition variable
#[derive(Debug, Default)]
pub struct StdSignal {
    flag: Mutex<bool>,
    cond: Condvar,
}

impl StdSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.flag.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CompletionSignal for StdSignal {
    fn set(&self) {
        *self.flag() = true;
        self.cond.notify_all();
    }

    fn clear(&self) {
        *self.flag() = false;
    }

    fn wait(&self, timeout_ms: u32) -> bool {
        let guard = self.flag();
        let mut guard = if timeout_ms == WAIT_FOREVER {
            self.cond
                .wait_while(guard, |set| !*set)
                .unwrap_or_else(PoisonError::into_inner)
        } else {
            self.cond
                .wait_timeout_while(guard, Duration::from_millis(u64::from(timeout_ms)), |set| {
                    !*set
                })
                .unwrap_or_else(PoisonError::into_inner)
                .0
        };
        core::mem::replace(&mut *guard, false)
    }
}

/// A signal with `'static` lifetime, shareable between a mock and an engine
pub fn leak_signal() -> &'static StdSignal {
    Box::leak(Box::new(StdSignal::new()))
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay that records the requested time instead of sleeping
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        *self.total_ns.borrow() / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

// =============================================================================
// Mock Bus
// =============================================================================

/// How the mock peripheral answers the next transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Completes (after the configured number of busy polls)
    Complete,
    /// Reports NACK / bus error
    Fault,
    /// Never completes and never interrupts
    Hang,
}

/// A transfer as seen by the mock peripheral
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub address: u8,
    pub direction: Direction,
    pub addressing: AddressingMode,
    /// Bytes written, or bytes delivered for a completed read
    pub bytes: Vec<u8>,
    pub mode: ExecutionMode,
}

#[derive(Debug)]
struct BusState {
    frames: Vec<Frame>,
    script: VecDeque<Response>,
    read_data: VecDeque<u8>,
    busy_polls: u32,
    pending_busy: u32,
    current: Option<Response>,
    starts: usize,
    resets: usize,
    enabled: bool,
    fail_init: bool,
}

/// Scriptable bus peripheral
///
/// Clones share state, so a test can keep a handle after moving the bus
/// into an engine. With [`with_irq`](Self::with_irq) the mock raises the
/// given signal on interrupt-mode completion or fault, like an ISR calling
/// the engine's interrupt hooks.
#[derive(Debug, Clone)]
pub struct MockBus {
    state: Arc<Mutex<BusState>>,
    irq: Option<&'static StdSignal>,
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState {
                frames: Vec::new(),
                script: VecDeque::new(),
                read_data: VecDeque::new(),
                busy_polls: 0,
                pending_busy: 0,
                current: None,
                starts: 0,
                resets: 0,
                enabled: true,
                fail_init: false,
            })),
            irq: None,
        }
    }

    /// Raise `signal` from "interrupt context" when an interrupt-mode
    /// transfer ends
    pub fn with_irq(mut self, signal: &'static StdSignal) -> Self {
        self.irq = Some(signal);
        self
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue responses for the next transfers (default: `Complete`)
    pub fn script(&self, responses: &[Response]) {
        self.state().script.extend(responses.iter().copied());
    }

    /// Queue bytes returned by reads (default: `0xFF`)
    pub fn queue_read(&self, bytes: &[u8]) {
        self.state().read_data.extend(bytes.iter().copied());
    }

    /// Number of `Busy` answers before a polled transfer completes
    pub fn set_busy_polls(&self, polls: u32) {
        self.state().busy_polls = polls;
    }

    /// Make `init` fail
    pub fn fail_init(&self) {
        self.state().fail_init = true;
    }

    /// Transfers started so far
    pub fn frames(&self) -> Vec<Frame> {
        self.state().frames.clone()
    }

    /// Number of `start` calls (including refused ones)
    pub fn starts(&self) -> usize {
        self.state().starts
    }

    /// Number of completed reset sequences
    pub fn resets(&self) -> usize {
        self.state().resets
    }

    /// Whether the peripheral is enabled
    pub fn is_enabled(&self) -> bool {
        self.state().enabled
    }
}

impl BusHardware for MockBus {
    fn init(&mut self) -> IoResult<()> {
        if self.state().fail_init {
            Err(IoError::HardwareFault)
        } else {
            Ok(())
        }
    }

    fn start(&mut self, request: &mut Request<'_>, mode: ExecutionMode) -> IoResult<()> {
        let response = {
            let mut state = self.state();
            state.starts += 1;
            if !state.enabled {
                return Err(IoError::HardwareFault);
            }
            let response = state.script.pop_front().unwrap_or(Response::Complete);
            let bytes = match &request.payload {
                Payload::Write(data) => data.to_vec(),
                Payload::Read(_) => Vec::new(),
            };
            state.frames.push(Frame {
                address: request.address,
                direction: request.direction(),
                addressing: request.mode,
                bytes,
                mode,
            });
            state.current = Some(response);
            state.pending_busy = match mode {
                ExecutionMode::Polled => state.busy_polls,
                ExecutionMode::Interrupt => 0,
            };
            response
        };

        if mode == ExecutionMode::Interrupt && response != Response::Hang {
            if let Some(irq) = self.irq {
                irq.set();
            }
        }
        std::thread::yield_now();
        Ok(())
    }

    fn status(&mut self, request: &mut Request<'_>) -> BusStatus {
        let mut state = self.state();
        match state.current {
            Some(Response::Hang) => BusStatus::Busy,
            Some(Response::Fault) => BusStatus::Fault,
            Some(Response::Complete) if state.pending_busy > 0 => {
                state.pending_busy -= 1;
                BusStatus::Busy
            }
            Some(Response::Complete) => {
                if let Payload::Read(buf) = &mut request.payload {
                    for byte in buf.iter_mut() {
                        *byte = state.read_data.pop_front().unwrap_or(0xFF);
                    }
                    let delivered = buf.to_vec();
                    if let Some(frame) = state.frames.last_mut() {
                        frame.bytes = delivered;
                    }
                }
                state.current = None;
                BusStatus::Complete
            }
            None => BusStatus::Complete,
        }
    }

    fn disable(&mut self) {
        self.state().enabled = false;
    }

    fn force_ready(&mut self) {
        let mut state = self.state();
        state.current = None;
        state.pending_busy = 0;
    }

    fn enable(&mut self) {
        let mut state = self.state();
        state.enabled = true;
        state.resets += 1;
    }
}

// =============================================================================
// Mock DMA
// =============================================================================

/// Circular DMA channel that "receives" bytes on demand
#[derive(Debug, Clone)]
pub struct MockDma {
    buffer: Vec<u8>,
    write: usize,
}

impl MockDma {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            write: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Write bytes as the hardware would, wrapping at the end
    pub fn receive(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.buffer[self.write] = byte;
            self.write = (self.write + 1) % self.buffer.len();
        }
    }

    /// Restart the channel at offset zero
    pub fn restart(&mut self) {
        self.write = 0;
    }
}

impl CircularDma for MockDma {
    fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn remaining(&self) -> usize {
        self.buffer.len() - self.write
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_signal_consumes_on_wait() {
        let signal = StdSignal::new();
        assert!(!signal.wait(0));
        signal.set();
        assert!(signal.wait(0));
        assert!(!signal.wait(1));
    }

    #[test]
    fn mock_delay_accumulates() {
        use embedded_hal::delay::DelayNs;

        let mut delay = MockDelay::new();
        delay.delay_us(10);
        delay.delay_ms(1);
        assert_eq!(delay.total_us(), 1_010);
    }

    #[test]
    fn mock_bus_reset_sequence() {
        let mut bus = MockBus::new();
        bus.disable();
        assert!(!bus.is_enabled());
        bus.force_ready();
        bus.enable();
        assert!(bus.is_enabled());
        assert_eq!(bus.resets(), 1);
    }

    #[test]
    fn mock_dma_wraps() {
        let mut dma = MockDma::new(4);
        dma.receive(&[1, 2, 3]);
        assert_eq!(dma.remaining(), 1);
        dma.receive(&[4, 5]);
        assert_eq!(dma.remaining(), 3);
        assert_eq!(dma.buffer(), &[5, 2, 3, 4]);
    }
}
