//! Dual-mode transaction engine.

use core::marker::PhantomData;

use embedded_hal::delay::DelayNs;

use super::descriptor::{Direction, Transaction};
use super::hardware::{BusHardware, BusStatus, Payload, Request};
use super::sequence;
use crate::config::EngineConfig;
use crate::error::{ConfigError, Error, IoError, IoResult, Result};
use crate::sync::{CompletionSignal, CriticalSectionCell, ExecutionMode, Lock, SchedulerProbe};

// =============================================================================
// Diagnostics
// =============================================================================

/// Per-instance event counters.
///
/// Counters wrap on overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Errors reported by the peripheral's error interrupt
    pub bus_errors: u32,
    /// Transfers that did not complete in time
    pub timeouts: u32,
    /// Transfers that ended in a hardware fault
    pub faults: u32,
    /// Instance resets (after failures and explicit requests)
    pub resets: u32,
    /// Descriptors completed successfully
    pub completed: u32,
}

// =============================================================================
// Instance
// =============================================================================

/// Hardware handle and delay provider of one instance, guarded by the
/// instance lock.
#[derive(Debug)]
pub struct Bus<H, D> {
    hw: H,
    delay: D,
    initialized: bool,
}

impl<H: BusHardware, D: DelayNs> Bus<H, D> {
    fn reset(&mut self) {
        self.hw.disable();
        self.hw.force_ready();
        self.hw.enable();
    }

    fn poll_until_done(
        &mut self,
        request: &mut Request<'_>,
        config: &EngineConfig,
        timeout_ms: u32,
    ) -> IoResult<()> {
        for _ in 0..config.poll_budget(timeout_ms) {
            match self.hw.status(request) {
                BusStatus::Complete => return Ok(()),
                BusStatus::Fault => return Err(IoError::HardwareFault),
                BusStatus::Busy => self.delay.delay_us(config.poll_interval_us),
            }
        }
        match self.hw.status(request) {
            BusStatus::Complete => Ok(()),
            BusStatus::Fault => Err(IoError::HardwareFault),
            BusStatus::Busy => Err(IoError::Timeout),
        }
    }
}

/// One peripheral instance: its bus, completion signal and counters.
///
/// `L` guards the bus for a whole batch. On the interrupt path the lock is
/// held while waiting for completion, so it must be a blocking (RTOS)
/// mutex there, never an interrupt-masking cell.
pub struct Instance<H, D, L, S> {
    bus: L,
    signal: S,
    diagnostics: CriticalSectionCell<Diagnostics>,
    _bus: PhantomData<fn() -> (H, D)>,
}

impl<H, D, L, S> Instance<H, D, L, S>
where
    H: BusHardware,
    D: DelayNs,
    L: Lock<Bus<H, D>>,
    S: CompletionSignal,
{
    /// Create an uninitialized instance.
    pub fn new(hw: H, delay: D, signal: S) -> Self {
        Self {
            bus: L::new(Bus {
                hw,
                delay,
                initialized: false,
            }),
            signal,
            diagnostics: CriticalSectionCell::new(Diagnostics::default()),
            _bus: PhantomData,
        }
    }

    fn record(&self, f: impl FnOnce(&mut Diagnostics)) {
        self.diagnostics.with(f);
    }
}

impl<H, D, L, S> core::fmt::Debug for Instance<H, D, L, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Instance")
            .field("diagnostics", &self.diagnostics.with_ref(|d| *d))
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Session
// =============================================================================

/// Exclusive access to one instance for the duration of a batch.
pub(crate) struct Session<'s, H, D, S> {
    bus: &'s mut Bus<H, D>,
    signal: &'s S,
    diagnostics: &'s CriticalSectionCell<Diagnostics>,
    config: &'s EngineConfig,
    mode: ExecutionMode,
    id: usize,
}

impl<H, D, S> Session<'_, H, D, S>
where
    H: BusHardware,
    D: DelayNs,
    S: CompletionSignal,
{
    /// Dispatch one request and wait for it to finish.
    ///
    /// On failure the instance has been reset before this returns.
    pub(crate) fn run(&mut self, request: &mut Request<'_>, timeout_ms: u32) -> Result<()> {
        self.signal.clear();
        match self.dispatch(request, timeout_ms) {
            Ok(()) => {
                self.diagnostics.with(|d| d.completed = d.completed.wrapping_add(1));
                Ok(())
            }
            Err(err) => {
                self.diagnostics.with(|d| {
                    match err {
                        IoError::Timeout => d.timeouts = d.timeouts.wrapping_add(1),
                        IoError::HardwareFault => d.faults = d.faults.wrapping_add(1),
                    }
                    d.resets = d.resets.wrapping_add(1);
                });
                match err {
                    IoError::Timeout => {
                        trace_warn!("bus{}: timeout after {} ms, resetting", self.id, timeout_ms);
                    }
                    IoError::HardwareFault => {
                        trace_error!(
                            "bus{}: hardware fault at {:#x}, resetting",
                            self.id,
                            request.address
                        );
                    }
                }
                self.bus.reset();
                self.signal.clear();
                Err(err.into())
            }
        }
    }

    fn dispatch(&mut self, request: &mut Request<'_>, timeout_ms: u32) -> IoResult<()> {
        self.bus.hw.start(request, self.mode)?;
        match self.mode {
            ExecutionMode::Polled => self.bus.poll_until_done(request, self.config, timeout_ms),
            ExecutionMode::Interrupt => {
                if !self.signal.wait(timeout_ms) {
                    return Err(IoError::Timeout);
                }
                match self.bus.hw.status(request) {
                    BusStatus::Complete => Ok(()),
                    // woken by the error interrupt, or woken with the
                    // transfer still running
                    BusStatus::Fault | BusStatus::Busy => Err(IoError::HardwareFault),
                }
            }
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Executes transaction batches on `N` peripheral instances.
///
/// Each call picks its [`ExecutionMode`] from the scheduler probe:
///
/// - **Polled** (no scheduler): start the transfer and poll its status
///   with the instance's delay provider until completion or timeout.
/// - **Interrupt** (scheduler running): start an interrupt-driven transfer
///   and block on the instance's completion signal, which the interrupt
///   handler raises through [`on_transfer_complete`](Self::on_transfer_complete)
///   or [`on_transfer_error`](Self::on_transfer_error).
///
/// A timeout or fault resets the instance before the error is returned,
/// so the next call starts from a clean peripheral. The engine never
/// retries on its own.
///
/// # Example
///
/// ```ignore
/// type I2cInstance = Instance<StmI2c, Delay, RtosMutex<Bus<StmI2c, Delay>>, BinarySemaphore>;
///
/// static ENGINE: TransactionEngine<
///     StmI2c, Delay, RtosMutex<_>, BinarySemaphore, SchedulerFlag, 2,
/// > = ...;
///
/// let mut id = [0u8; 1];
/// let mut batch = [
///     Transaction::read(0x68, &mut id).with_register(0x75, RegisterWidth::One),
/// ];
/// ENGINE.transfer(0, &mut batch)?;
/// ```
pub struct TransactionEngine<H, D, L, S, P, const N: usize> {
    instances: [Instance<H, D, L, S>; N],
    probe: P,
    config: EngineConfig,
}

impl<H, D, L, S, P, const N: usize> TransactionEngine<H, D, L, S, P, N>
where
    H: BusHardware,
    D: DelayNs,
    L: Lock<Bus<H, D>>,
    S: CompletionSignal,
    P: SchedulerProbe,
{
    /// Create an engine over `instances` with the default configuration.
    pub fn new(instances: [Instance<H, D, L, S>; N], probe: P) -> Self {
        Self {
            instances,
            probe,
            config: EngineConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of instances
    #[inline(always)]
    #[must_use]
    pub const fn instance_count(&self) -> usize {
        N
    }

    fn instance(&self, id: usize) -> Result<&Instance<H, D, L, S>> {
        self.instances
            .get(id)
            .ok_or(Error::Config(ConfigError::InvalidInstance))
    }

    /// Initialize the peripheral of instance `id`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidInstance`] if `id` is out of range
    /// - [`ConfigError::InitFailed`] if the hardware could not be brought up
    pub fn init(&self, id: usize) -> Result<()> {
        let instance = self.instance(id)?;
        instance.bus.with_lock(|bus| match bus.hw.init() {
            Ok(()) => {
                bus.initialized = true;
                instance.signal.clear();
                trace_debug!("bus{}: initialized", id);
                Ok(())
            }
            Err(err) => {
                trace_error!("bus{}: init failed: {}", id, err.as_str());
                Err(ConfigError::InitFailed.into())
            }
        })
    }

    /// Whether [`init`](Self::init) succeeded for instance `id`
    #[must_use]
    pub fn is_initialized(&self, id: usize) -> bool {
        self.instance(id)
            .is_ok_and(|instance| instance.bus.with_lock(|bus| bus.initialized))
    }

    /// Reset instance `id` (disable, force ready, re-enable).
    ///
    /// Waits for any batch in progress on the instance to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInstance`] if `id` is out of range.
    pub fn reset(&self, id: usize) -> Result<()> {
        let instance = self.instance(id)?;
        instance.bus.with_lock(|bus| {
            bus.reset();
            instance.signal.clear();
        });
        instance.record(|d| d.resets = d.resets.wrapping_add(1));
        trace_warn!("bus{}: reset requested", id);
        Ok(())
    }

    /// Snapshot of instance `id`'s counters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInstance`] if `id` is out of range.
    pub fn diagnostics(&self, id: usize) -> Result<Diagnostics> {
        let instance = self.instance(id)?;
        Ok(instance.diagnostics.with_ref(|d| *d))
    }

    /// Execute `batch` on instance `id` using the mode the scheduler probe
    /// selects right now.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the batch is invalid (nothing was sent)
    /// - [`IoError::Timeout`] or [`IoError::HardwareFault`] if a descriptor
    ///   failed; earlier descriptors of the batch have completed, later
    ///   ones were not sent, and the instance has been reset
    pub fn transfer(&self, id: usize, batch: &mut [Transaction<'_>]) -> Result<()> {
        self.transfer_with_mode(id, batch, self.probe.mode())
    }

    /// Execute `batch` on instance `id` in an explicit mode.
    ///
    /// Descriptors run in order under one acquisition of the instance
    /// lock. Each descriptor's pre-dispatch callback runs right before it,
    /// still under the lock.
    ///
    /// # Errors
    ///
    /// Same as [`transfer`](Self::transfer).
    pub fn transfer_with_mode(
        &self,
        id: usize,
        batch: &mut [Transaction<'_>],
        mode: ExecutionMode,
    ) -> Result<()> {
        if let Err(err) = sequence::validate(batch) {
            trace_debug!("bus{}: rejected batch: {}", id, err.as_str());
            return Err(err.into());
        }
        let default_timeout = self.config.default_timeout_ms;

        self.with_session(id, mode, |session| {
            for index in 0..batch.len() {
                let (done, rest) = batch.split_at_mut(index);
                let Some(current) = rest.first_mut() else {
                    break;
                };

                if let Some(prepare) = current.prepare.as_deref_mut() {
                    prepare(&*done, &mut *current.data);
                }

                let payload = match current.direction {
                    Direction::Read => Payload::Read(&mut *current.data),
                    Direction::Write => Payload::Write(&*current.data),
                };
                let mut request = Request {
                    address: current.address,
                    mode: current.mode,
                    payload,
                };
                session.run(&mut request, current.timeout_ms.unwrap_or(default_timeout))?;
            }
            Ok(())
        })
    }

    /// Run `f` with exclusive access to instance `id`.
    pub(crate) fn with_session<R>(
        &self,
        id: usize,
        mode: ExecutionMode,
        f: impl FnOnce(&mut Session<'_, H, D, S>) -> Result<R>,
    ) -> Result<R> {
        let instance = self.instance(id)?;
        instance.bus.with_lock(|bus| {
            let mut session = Session {
                bus,
                signal: &instance.signal,
                diagnostics: &instance.diagnostics,
                config: &self.config,
                mode,
                id,
            };
            f(&mut session)
        })
    }

    /// The execution mode the next [`transfer`](Self::transfer) would use
    #[must_use]
    pub fn current_mode(&self) -> ExecutionMode {
        self.probe.mode()
    }

    // -------------------------------------------------------------------------
    // Interrupt-side entry points
    // -------------------------------------------------------------------------

    /// Transfer-complete interrupt hook for instance `id`.
    ///
    /// Only raises the completion signal. Unknown ids are ignored.
    #[inline]
    pub fn on_transfer_complete(&self, id: usize) {
        if let Some(instance) = self.instances.get(id) {
            instance.signal.set();
        }
    }

    /// Error interrupt hook for instance `id`.
    ///
    /// Counts the error and raises the completion signal; the waiting task
    /// reads the fault from the hardware status. Unknown ids are ignored.
    #[inline]
    pub fn on_transfer_error(&self, id: usize) {
        if let Some(instance) = self.instances.get(id) {
            instance.record(|d| d.bus_errors = d.bus_errors.wrapping_add(1));
            instance.signal.set();
        }
    }
}

impl<H, D, L, S, P, const N: usize> core::fmt::Debug for TransactionEngine<H, D, L, S, P, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransactionEngine")
            .field("instances", &N)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
