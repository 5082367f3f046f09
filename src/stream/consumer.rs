//! DMA receive stream consumer.

use super::cursor::StreamCursor;
use super::sink::ByteSink;
use crate::error::ConfigResult;
use crate::sync::CompletionSignal;

/// A DMA channel running in circular mode.
///
/// The channel keeps writing into [`buffer`](Self::buffer) and wraps to the
/// start when it reaches the end. [`remaining`](Self::remaining) is the
/// hardware transfer counter (bytes left before the next wrap).
pub trait CircularDma {
    /// The DMA target buffer.
    fn buffer(&self) -> &[u8];

    /// Transfers left before the channel wraps to the start of the buffer.
    fn remaining(&self) -> usize;
}

impl<D: CircularDma + ?Sized> CircularDma for &D {
    #[inline]
    fn buffer(&self) -> &[u8] {
        (**self).buffer()
    }

    #[inline]
    fn remaining(&self) -> usize {
        (**self).remaining()
    }
}

impl<D: CircularDma + ?Sized> CircularDma for &mut D {
    #[inline]
    fn buffer(&self) -> &[u8] {
        (**self).buffer()
    }

    #[inline]
    fn remaining(&self) -> usize {
        (**self).remaining()
    }
}

/// Receive-side interrupt flags relevant to the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxEvents {
    /// DMA reached the middle of the buffer
    pub half_transfer: bool,
    /// DMA reached the end of the buffer and wrapped
    pub transfer_complete: bool,
    /// Receive line went idle (end of a burst)
    pub line_idle: bool,
}

impl RxEvents {
    /// No events pending
    pub const NONE: Self = Self {
        half_transfer: false,
        transfer_complete: false,
        line_idle: false,
    };

    /// Whether any event is pending
    #[inline]
    #[must_use]
    pub const fn any(&self) -> bool {
        self.half_transfer || self.transfer_complete || self.line_idle
    }
}

/// Interrupt-side hook: wake the consumer if any receive event fired.
///
/// Call from the DMA and UART interrupt handlers after reading (and
/// acknowledging) the hardware flags. Returns whether the signal was set.
#[inline]
pub fn on_rx_interrupt<S: CompletionSignal + ?Sized>(events: RxEvents, signal: &S) -> bool {
    if events.any() {
        signal.set();
        true
    } else {
        false
    }
}

/// Drains a circular DMA channel into a [`ByteSink`].
///
/// # Example
///
/// ```ignore
/// static RX_EVENT: SpinSignal = SpinSignal::new();
/// static mut RX_BUF: [u8; DEFAULT_DMA_RX_BUFFER_SIZE] = [0; DEFAULT_DMA_RX_BUFFER_SIZE];
///
/// let mut consumer = StreamConsumer::new(uart_rx_dma)?;
/// loop {
///     consumer.wait_and_poll(&RX_EVENT, 10, &mut |data: &[u8]| parser.feed(data))?;
/// }
/// ```
#[derive(Debug)]
pub struct StreamConsumer<C> {
    dma: C,
    cursor: StreamCursor,
}

impl<C: CircularDma> StreamConsumer<C> {
    /// Bind a consumer to a running channel, starting at offset zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`](crate::ConfigError::ZeroCapacity)
    /// if the channel's buffer is empty.
    pub fn new(dma: C) -> ConfigResult<Self> {
        let cursor = StreamCursor::new(dma.buffer().len())?;
        Ok(Self { dma, cursor })
    }

    /// Forward everything received since the last poll.
    ///
    /// Returns the number of bytes delivered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCursor`](crate::ConfigError::InvalidCursor)
    /// if the channel reports an impossible transfer count.
    pub fn poll<K: ByteSink + ?Sized>(&mut self, sink: &mut K) -> ConfigResult<usize> {
        let remaining = self.dma.remaining();
        let delivered = self.cursor.poll(self.dma.buffer(), remaining, sink)?;
        if delivered > 0 {
            trace_debug!("stream: {} bytes", delivered);
        }
        Ok(delivered)
    }

    /// Wait for a receive event, then drain.
    ///
    /// Drains even when the wait times out, which picks up a trailing
    /// partial burst that raised no interrupt.
    ///
    /// # Errors
    ///
    /// Same as [`poll`](Self::poll).
    pub fn wait_and_poll<S, K>(
        &mut self,
        signal: &S,
        timeout_ms: u32,
        sink: &mut K,
    ) -> ConfigResult<usize>
    where
        S: CompletionSignal + ?Sized,
        K: ByteSink + ?Sized,
    {
        let _ = signal.wait(timeout_ms);
        self.poll(sink)
    }

    /// Re-synchronize after the DMA channel has been restarted.
    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// The read cursor
    #[must_use]
    pub fn cursor(&self) -> &StreamCursor {
        &self.cursor
    }

    /// Access the underlying channel
    #[must_use]
    pub fn dma(&self) -> &C {
        &self.dma
    }

    /// Mutable access to the underlying channel
    pub fn dma_mut(&mut self) -> &mut C {
        &mut self.dma
    }

    /// Release the channel
    pub fn into_inner(self) -> C {
        self.dma
    }
}
