//! Completion signals bridging interrupt and task context.
//!
//! A completion signal is a binary, single-slot notification: the interrupt
//! side calls [`CompletionSignal::set`], the task side waits with a timeout.
//! Setting an already-set signal is idempotent (nothing is queued), so the
//! waiter must [`clear`](CompletionSignal::clear) it immediately before
//! arming the event it is going to wait for.

use super::primitives::CriticalSectionCell;
use crate::constants::{DEFAULT_SPINS_PER_MS, WAIT_FOREVER};

/// Single-slot notification primitive.
///
/// # Contexts
///
/// - `set` must be callable from interrupt context.
/// - `wait` is only called from task context (or the pre-scheduler main
///   loop for spin-based implementations).
pub trait CompletionSignal {
    /// Raise the signal. Idempotent.
    fn set(&self);

    /// Drop any pending notification without waiting.
    fn clear(&self);

    /// Wait up to `timeout_ms` for the signal and consume it.
    ///
    /// Returns `true` if the signal was observed, `false` on timeout.
    /// A timeout of zero only checks the current state. A timeout of
    /// [`WAIT_FOREVER`] never expires.
    fn wait(&self, timeout_ms: u32) -> bool;
}

impl<S: CompletionSignal + ?Sized> CompletionSignal for &S {
    #[inline]
    fn set(&self) {
        (**self).set();
    }

    #[inline]
    fn clear(&self) {
        (**self).clear();
    }

    #[inline]
    fn wait(&self, timeout_ms: u32) -> bool {
        (**self).wait(timeout_ms)
    }
}

/// Signal that never fires.
///
/// Used where blocking semantics are not configured: every wait returns
/// immediately with `false`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSignal;

impl CompletionSignal for NoSignal {
    #[inline]
    fn set(&self) {}

    #[inline]
    fn clear(&self) {}

    #[inline]
    fn wait(&self, _timeout_ms: u32) -> bool {
        false
    }
}

/// Interrupt-safe flag with a bounded busy-wait.
///
/// Intended for the degenerate "no scheduler yet" context, where blocking
/// primitives are not meaningful and waiting has to be a bounded spin.
/// The spin budget is an iteration count, not a calibrated time, so
/// timeouts are approximate.
pub struct SpinSignal {
    flag: CriticalSectionCell<bool>,
    spins_per_ms: u32,
}

impl SpinSignal {
    /// Create a cleared signal with the default spin budget.
    pub const fn new() -> Self {
        Self::with_spins_per_ms(DEFAULT_SPINS_PER_MS)
    }

    /// Create a cleared signal treating `spins_per_ms` iterations as 1 ms.
    pub const fn with_spins_per_ms(spins_per_ms: u32) -> Self {
        Self {
            flag: CriticalSectionCell::new(false),
            spins_per_ms: if spins_per_ms == 0 { 1 } else { spins_per_ms },
        }
    }

    /// Check the signal without consuming it.
    pub fn is_set(&self) -> bool {
        self.flag.get()
    }

    fn take(&self) -> bool {
        self.flag.replace(false)
    }
}

impl Default for SpinSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionSignal for SpinSignal {
    #[inline]
    fn set(&self) {
        self.flag.replace(true);
    }

    #[inline]
    fn clear(&self) {
        self.flag.replace(false);
    }

    fn wait(&self, timeout_ms: u32) -> bool {
        if self.take() {
            return true;
        }
        if timeout_ms == WAIT_FOREVER {
            loop {
                if self.take() {
                    return true;
                }
                core::hint::spin_loop();
            }
        }

        let budget = timeout_ms.saturating_mul(self.spins_per_ms);
        for _ in 0..budget {
            if self.take() {
                return true;
            }
            core::hint::spin_loop();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_signal_never_fires() {
        let signal = NoSignal;
        signal.set();
        assert!(!signal.wait(10));
    }

    #[test]
    fn spin_signal_consumes_on_wait() {
        let signal = SpinSignal::new();
        signal.set();
        assert!(signal.is_set());
        assert!(signal.wait(0));
        assert!(!signal.is_set());
        assert!(!signal.wait(0));
    }

    #[test]
    fn spin_signal_set_is_idempotent() {
        let signal = SpinSignal::new();
        signal.set();
        signal.set();
        assert!(signal.wait(0));
        assert!(!signal.wait(0));
    }

    #[test]
    fn spin_signal_clear_drops_stale_notification() {
        let signal = SpinSignal::with_spins_per_ms(10);
        signal.set();
        signal.clear();
        assert!(!signal.wait(1));
    }

    #[test]
    fn spin_signal_times_out() {
        let signal = SpinSignal::with_spins_per_ms(100);
        assert!(!signal.wait(3));
    }

    #[test]
    fn signal_by_reference() {
        let signal = SpinSignal::new();
        let by_ref = &signal;
        by_ref.set();
        assert!(CompletionSignal::wait(&by_ref, 0));
    }
}
