//! Scheduler detection and execution strategy selection.

use super::primitives::CriticalSectionCell;

/// How a transfer is carried out.
///
/// Selected per call, never cached, because the scheduler may start after
/// the engine has been initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExecutionMode {
    /// No scheduler: start the transfer and poll status with a bounded spin
    Polled,
    /// Scheduler running: start an interrupt-driven transfer and block on
    /// the instance's completion signal
    Interrupt,
}

/// Reports whether a task scheduler is running.
///
/// RTOS ports implement this with the kernel's own query (for example a
/// scheduler-state call); bare-metal builds use [`NoScheduler`].
pub trait SchedulerProbe {
    /// Whether blocking waits are currently meaningful.
    fn is_running(&self) -> bool;

    /// Execution strategy for the current call.
    #[inline]
    fn mode(&self) -> ExecutionMode {
        if self.is_running() {
            ExecutionMode::Interrupt
        } else {
            ExecutionMode::Polled
        }
    }
}

impl<P: SchedulerProbe + ?Sized> SchedulerProbe for &P {
    #[inline]
    fn is_running(&self) -> bool {
        (**self).is_running()
    }
}

/// Probe for builds without a scheduler: always polled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScheduler;

impl SchedulerProbe for NoScheduler {
    #[inline]
    fn is_running(&self) -> bool {
        false
    }
}

/// Probe backed by a flag the firmware sets when its scheduler starts.
///
/// # Example
///
/// ```ignore
/// static SCHEDULER: SchedulerFlag = SchedulerFlag::new();
///
/// fn main() -> ! {
///     // early boot: transfers are polled
///     SCHEDULER.mark_started();
///     rtos::start_scheduler();
/// }
/// ```
#[derive(Default)]
pub struct SchedulerFlag {
    running: CriticalSectionCell<bool>,
}

impl SchedulerFlag {
    /// Create a flag in the "not started" state.
    pub const fn new() -> Self {
        Self {
            running: CriticalSectionCell::new(false),
        }
    }

    /// Record that the scheduler is now running.
    pub fn mark_started(&self) {
        self.running.replace(true);
    }

    /// Record that the scheduler has stopped (e.g. before a bootloader jump).
    pub fn mark_stopped(&self) {
        self.running.replace(false);
    }
}

impl SchedulerProbe for SchedulerFlag {
    #[inline]
    fn is_running(&self) -> bool {
        self.running.get()
    }
}

/// Probe wrapping a plain query function.
#[derive(Debug, Clone, Copy)]
pub struct FnProbe<F>(pub F);

impl<F: Fn() -> bool> SchedulerProbe for FnProbe<F> {
    #[inline]
    fn is_running(&self) -> bool {
        (self.0)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_scheduler_is_polled() {
        assert_eq!(NoScheduler.mode(), ExecutionMode::Polled);
    }

    #[test]
    fn scheduler_flag_switches_mode() {
        let flag = SchedulerFlag::new();
        assert_eq!(flag.mode(), ExecutionMode::Polled);
        flag.mark_started();
        assert_eq!(flag.mode(), ExecutionMode::Interrupt);
        flag.mark_stopped();
        assert_eq!((&flag).mode(), ExecutionMode::Polled);
    }

    #[test]
    fn fn_probe_is_reevaluated() {
        use core::cell::Cell;

        let running = Cell::new(false);
        let probe = FnProbe(|| running.get());
        assert_eq!(probe.mode(), ExecutionMode::Polled);
        running.set(true);
        assert_eq!(probe.mode(), ExecutionMode::Interrupt);
    }
}
