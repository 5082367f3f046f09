//! Pluggable mutual exclusion.
//!
//! A [`Lock`] owns the state it protects and only hands it out inside a
//! closure, so a lock can never be left held on an early return or error.

use core::cell::RefCell;

/// Scoped mutual exclusion over a value of type `T`.
///
/// Implemented by whichever concurrency backend is active:
///
/// - [`NoLock`]: single execution context, zero overhead
/// - [`CriticalSectionCell`](super::CriticalSectionCell): masks interrupts,
///   for short ISR-shared updates
/// - RTOS mutexes: supplied by the firmware for locks that must be held
///   across a blocking wait (the transaction engine's batch lock)
///
/// Wake order among contending owners is up to the backend (FIFO or
/// priority based are both acceptable).
pub trait Lock<T> {
    /// Wrap `value` in a new lock.
    fn new(value: T) -> Self
    where
        Self: Sized;

    /// Run `f` with exclusive access to the protected value.
    ///
    /// The lock is released when `f` returns.
    fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

/// Lock for single-context use.
///
/// Performs no synchronization at all. It is deliberately `!Sync`, so a
/// buffer or engine built on it cannot be shared between contexts.
#[derive(Debug, Default)]
pub struct NoLock<T> {
    inner: RefCell<T>,
}

impl<T> NoLock<T> {
    /// Create a new unsynchronized lock (const, usable in statics of
    /// single-threaded programs).
    pub const fn new(value: T) -> Self {
        Self {
            inner: RefCell::new(value),
        }
    }

    /// Consume the lock and return the protected value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T> Lock<T> for NoLock<T> {
    fn new(value: T) -> Self {
        NoLock::new(value)
    }

    #[inline]
    fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}
