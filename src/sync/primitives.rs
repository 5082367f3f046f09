//! Synchronization primitives for ISR-safe access.
//!
//! Low-level primitive shared by the lock, signal and diagnostics code.

use core::cell::RefCell;
use critical_section::Mutex;

use super::lock::Lock;

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` for safe mutable access
/// from both normal code and interrupt handlers.
///
/// As a [`Lock`] it masks interrupts for the whole closure, so it suits
/// short ring-buffer updates but must never guard a blocking wait.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Execute a closure with immutable access.
    #[inline]
    pub fn with_ref<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        critical_section::with(|cs| {
            let value = self.inner.borrow_ref(cs);
            f(&value)
        })
    }
}

impl<T: Copy> CriticalSectionCell<T> {
    /// Copy the current value out.
    #[inline]
    pub fn get(&self) -> T {
        self.with_ref(|v| *v)
    }

    /// Replace the value, returning the previous one.
    #[inline]
    pub fn replace(&self, value: T) -> T {
        self.with(|v| core::mem::replace(v, value))
    }
}

impl<T: Default> Default for CriticalSectionCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// SAFETY: CriticalSectionCell uses critical sections to protect all access.
unsafe impl<T: Send> Sync for CriticalSectionCell<T> {}

impl<T> Lock<T> for CriticalSectionCell<T> {
    fn new(value: T) -> Self {
        CriticalSectionCell::new(value)
    }

    #[inline]
    fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.with(f)
    }
}
