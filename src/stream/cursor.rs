//! Read cursor over a hardware-filled circular buffer.

use core::ops::Range;

use super::sink::ByteSink;
use crate::error::{ConfigError, ConfigResult};

/// Byte ranges that became readable since the previous poll.
///
/// Holds at most two ranges: the tail of the buffer followed by its head
/// when the hardware wrapped around in between.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segments {
    first: Option<Range<usize>>,
    second: Option<Range<usize>>,
}

impl Segments {
    const fn none() -> Self {
        Self {
            first: None,
            second: None,
        }
    }

    /// Total number of bytes covered
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.first.as_ref().map_or(0, Range::len) + self.second.as_ref().map_or(0, Range::len)
    }

    /// Whether nothing new arrived
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }
}

impl Iterator for Segments {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.first.take().or_else(|| self.second.take())
    }
}

/// Tracks how far a circular DMA buffer has been consumed.
///
/// The hardware reports how many transfers remain before it wraps; the
/// write position is `capacity - remaining`. Everything between the last
/// consumed position and the write position is new data.
///
/// Data is lost if the hardware laps the cursor (writes a full buffer or
/// more) between two polls. Poll at least twice per buffer fill, e.g. on
/// the half-transfer and transfer-complete interrupts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamCursor {
    last: usize,
    capacity: usize,
}

impl StreamCursor {
    /// Create a cursor for a buffer of `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `capacity` is zero.
    pub const fn new(capacity: usize) -> ConfigResult<Self> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self { last: 0, capacity })
    }

    /// Buffer capacity in bytes
    #[inline(always)]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Last consumed position, always in `[0, capacity)`
    #[inline(always)]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.last
    }

    /// Re-synchronize to the start of the buffer (after a DMA restart).
    pub fn reset(&mut self) {
        self.last = 0;
    }

    /// Move the cursor to the hardware write position and return the
    /// ranges that were passed over.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCursor`] if `remaining` exceeds the
    /// capacity. The cursor is not moved in that case.
    pub fn advance(&mut self, remaining: usize) -> ConfigResult<Segments> {
        if remaining > self.capacity {
            return Err(ConfigError::InvalidCursor);
        }
        let position = self.capacity - remaining;

        let segments = if position == self.last {
            Segments::none()
        } else if position > self.last {
            Segments {
                first: Some(self.last..position),
                second: None,
            }
        } else {
            Segments {
                first: Some(self.last..self.capacity),
                second: (position > 0).then(|| 0..position),
            }
        };

        self.last = if position == self.capacity {
            0
        } else {
            position
        };
        Ok(segments)
    }

    /// Advance and hand the new bytes of `buffer` to `sink`.
    ///
    /// Returns the number of bytes delivered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCursor`] if `remaining` is out of
    /// range or `buffer` is not exactly `capacity` bytes long.
    pub fn poll<K: ByteSink + ?Sized>(
        &mut self,
        buffer: &[u8],
        remaining: usize,
        sink: &mut K,
    ) -> ConfigResult<usize> {
        if buffer.len() != self.capacity {
            return Err(ConfigError::InvalidCursor);
        }
        let segments = self.advance(remaining)?;
        let total = segments.total_len();
        for range in segments {
            sink.deliver(&buffer[range]);
        }
        Ok(total)
    }
}
