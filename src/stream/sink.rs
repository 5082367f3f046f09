//! Destination for streamed bytes.

/// Receives contiguous byte runs drained from a stream.
///
/// Implemented for closures taking `&[u8]` and for shared references to a
/// [`RingBuffer`](crate::buffer::RingBuffer), which stores what fits and
/// counts the rest as overflow.
pub trait ByteSink {
    /// Accept one contiguous run of bytes.
    fn deliver(&mut self, data: &[u8]);
}

impl<F> ByteSink for F
where
    F: FnMut(&[u8]),
{
    #[inline]
    fn deliver(&mut self, data: &[u8]) {
        self(data);
    }
}
