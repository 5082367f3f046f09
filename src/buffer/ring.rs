//! Lock-pluggable circular byte buffer.

use crate::constants::NO_WAIT;
use crate::error::{BufferError, BufferResult, ConfigError, ConfigResult};
use crate::stream::ByteSink;
use crate::sync::{CompletionSignal, Lock, NoLock, NoSignal};

/// Offsets and storage of a [`RingBuffer`], guarded by its lock.
///
/// Only reachable through the buffer's operations; exposed so that lock
/// types can be named (`CriticalSectionCell<RingState<'a>>`).
#[derive(Debug)]
pub struct RingState<'a> {
    storage: &'a mut [u8],
    read: usize,
    write: usize,
    used: usize,
    overflow: usize,
}

impl<'a> RingState<'a> {
    fn new(storage: &'a mut [u8]) -> Self {
        Self {
            storage,
            read: 0,
            write: 0,
            used: 0,
            overflow: 0,
        }
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline(always)]
    fn free(&self) -> usize {
        self.capacity() - self.used
    }

    fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
        self.used = 0;
        self.overflow = 0;
    }

    fn push(&mut self, byte: u8) -> BufferResult<()> {
        if self.used == self.capacity() {
            return Err(BufferError::Full);
        }
        self.storage[self.write] = byte;
        self.write = (self.write + 1) % self.capacity();
        self.used += 1;
        Ok(())
    }

    fn pop(&mut self) -> BufferResult<u8> {
        if self.used == 0 {
            return Err(BufferError::Empty);
        }
        let byte = self.storage[self.read];
        self.read = (self.read + 1) % self.capacity();
        self.used -= 1;
        Ok(byte)
    }

    /// Copy as much of `data` as fits, tail segment first.
    fn write(&mut self, data: &[u8]) -> usize {
        let count = data.len().min(self.free());
        let tail = count.min(self.capacity() - self.write);
        let (first, second) = data[..count].split_at(tail);

        self.storage[self.write..self.write + tail].copy_from_slice(first);
        self.storage[..second.len()].copy_from_slice(second);

        self.write = (self.write + count) % self.capacity();
        self.used += count;
        self.overflow = self.overflow.saturating_add(data.len() - count);
        count
    }

    fn read(&mut self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.used);
        let tail = count.min(self.capacity() - self.read);
        let (first, second) = out[..count].split_at_mut(tail);

        first.copy_from_slice(&self.storage[self.read..self.read + tail]);
        let head = second.len();
        second.copy_from_slice(&self.storage[..head]);

        self.read = (self.read + count) % self.capacity();
        self.used -= count;
        count
    }
}

/// Fixed-capacity FIFO of bytes over caller-owned storage.
///
/// The buffer is parameterized by a [`Lock`] guarding its offsets and a
/// pair of [`CompletionSignal`]s used to block consumers on an empty buffer
/// and producers on a full one.
///
/// - `NoLock` (the default) makes the buffer `!Sync`: it can only be used
///   from one execution context.
/// - `CriticalSectionCell` allows interrupt handlers to push while a task
///   pops.
///
/// Each direction has its own signal. A push raises `data` and a pop
/// raises `space`; a caller that stores or takes a byte while more remain
/// passes its own signal on, so several blocked callers on the same side
/// all get woken in turn. A woken caller re-checks the buffer before
/// acting on the wakeup.
///
/// # Example
///
/// ```
/// use ph_iosync::buffer::RingBuffer;
/// use ph_iosync::constants::NO_WAIT;
///
/// let mut storage = [0u8; 4];
/// let ring = RingBuffer::new(&mut storage).unwrap();
/// ring.push(7, NO_WAIT).unwrap();
/// assert_eq!(ring.pop(NO_WAIT), Ok(7));
/// ```
pub struct RingBuffer<'a, L = NoLock<RingState<'a>>, S = NoSignal>
where
    L: Lock<RingState<'a>>,
{
    state: L,
    data: S,
    space: S,
    capacity: usize,
    _storage: core::marker::PhantomData<&'a mut [u8]>,
}

impl<'a> RingBuffer<'a> {
    /// Create a single-context buffer over `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `storage` is empty.
    pub fn new(storage: &'a mut [u8]) -> ConfigResult<Self> {
        if storage.is_empty() {
            return Err(ConfigError::ZeroCapacity);
        }
        let capacity = storage.len();
        Ok(Self {
            state: NoLock::new(RingState::new(storage)),
            data: NoSignal,
            space: NoSignal,
            capacity,
            _storage: core::marker::PhantomData,
        })
    }
}

impl<'a, S> RingBuffer<'a, NoLock<RingState<'a>>, S> {
    /// Move the buffer under a different lock.
    #[must_use]
    pub fn with_lock<L2: Lock<RingState<'a>>>(self) -> RingBuffer<'a, L2, S> {
        RingBuffer {
            state: L2::new(self.state.into_inner()),
            data: self.data,
            space: self.space,
            capacity: self.capacity,
            _storage: core::marker::PhantomData,
        }
    }
}

impl<'a, L: Lock<RingState<'a>>> RingBuffer<'a, L, NoSignal> {
    /// Attach the wakeup signals, enabling blocking push and pop.
    ///
    /// `data` is raised when bytes are stored and wakes blocked
    /// [`pop`](RingBuffer::pop) calls; `space` is raised when bytes are
    /// taken and wakes blocked [`push`](RingBuffer::push) calls. The two
    /// must be distinct signals.
    #[must_use]
    pub fn with_signals<S2: CompletionSignal>(
        self,
        data: S2,
        space: S2,
    ) -> RingBuffer<'a, L, S2> {
        RingBuffer {
            state: self.state,
            data,
            space,
            capacity: self.capacity,
            _storage: core::marker::PhantomData,
        }
    }
}

impl<'a, L, S> RingBuffer<'a, L, S>
where
    L: Lock<RingState<'a>>,
    S: CompletionSignal,
{
    /// Total capacity in bytes
    #[inline(always)]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard all content and reset the offsets.
    pub fn clear(&self) {
        self.state.with_lock(RingState::clear);
    }

    /// Append one byte.
    ///
    /// When the buffer is full and `timeout_ms` is not [`NO_WAIT`], waits
    /// on the `space` signal. `timeout_ms` bounds each wait, not the whole
    /// call: a wakeup that loses the freed slot to another producer starts
    /// a new wait of the same length. The call fails once a wait expires
    /// with the buffer still full.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Full`] if no space became available. The
    /// offsets are left untouched in that case.
    pub fn push(&self, byte: u8, timeout_ms: u32) -> BufferResult<()> {
        loop {
            match self.state.with_lock(|state| state.push(byte).map(|()| state.free())) {
                Ok(free) => {
                    self.data.set();
                    if free > 0 {
                        self.space.set();
                    }
                    return Ok(());
                }
                Err(err) => {
                    if timeout_ms == NO_WAIT || !self.space.wait(timeout_ms) {
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Remove the oldest byte.
    ///
    /// When the buffer is empty and `timeout_ms` is not [`NO_WAIT`], waits
    /// on the `data` signal. As with [`push`](Self::push), `timeout_ms`
    /// bounds each wait rather than the whole call.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Empty`] if no data arrived in time.
    pub fn pop(&self, timeout_ms: u32) -> BufferResult<u8> {
        loop {
            match self.state.with_lock(|state| state.pop().map(|byte| (byte, state.used))) {
                Ok((byte, used)) => {
                    self.space.set();
                    if used > 0 {
                        self.data.set();
                    }
                    return Ok(byte);
                }
                Err(err) => {
                    if timeout_ms == NO_WAIT || !self.data.wait(timeout_ms) {
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Append as many bytes of `data` as fit without waiting.
    ///
    /// Bytes that do not fit are dropped and added to the overflow count.
    /// Returns the number of bytes stored.
    pub fn write(&self, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }
        let written = self.state.with_lock(|state| state.write(data));
        if written > 0 {
            self.data.set();
        }
        if written < data.len() {
            trace_warn!("ring overflow: dropped {} bytes", data.len() - written);
        }
        written
    }

    /// Remove up to `out.len()` bytes without waiting.
    ///
    /// Returns the number of bytes copied into `out`.
    pub fn read(&self, out: &mut [u8]) -> usize {
        if out.is_empty() {
            return 0;
        }
        let count = self.state.with_lock(|state| state.read(out));
        if count > 0 {
            self.space.set();
        }
        count
    }

    /// Bytes currently stored (advisory)
    #[must_use]
    pub fn used_size(&self) -> usize {
        self.state.with_lock(|state| state.used)
    }

    /// Bytes that can be pushed without waiting (advisory)
    #[must_use]
    pub fn free_size(&self) -> usize {
        self.state.with_lock(|state| state.free())
    }

    /// Whether the buffer holds no data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used_size() == 0
    }

    /// Whether the buffer has no free space
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_size() == 0
    }

    /// Bytes dropped by [`write`](Self::write) since the last clear
    #[must_use]
    pub fn overflow_count(&self) -> usize {
        self.state.with_lock(|state| state.overflow)
    }
}

impl<'a, L, S> ByteSink for &RingBuffer<'a, L, S>
where
    L: Lock<RingState<'a>>,
    S: CompletionSignal,
{
    fn deliver(&mut self, data: &[u8]) {
        self.write(data);
    }
}

impl<'a, L, S> core::fmt::Debug for RingBuffer<'a, L, S>
where
    L: Lock<RingState<'a>>,
    S: CompletionSignal,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("used", &self.used_size())
            .finish_non_exhaustive()
    }
}
