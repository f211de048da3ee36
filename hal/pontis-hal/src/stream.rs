//! Stream staging buffer abstraction
//!
//! Streamed writes are fed by the host link into a bounded buffer; the I2C
//! side drains whatever has been staged on each scheduler tick.

/// Bounded byte buffer shared between the host link and a streamed write
pub trait StreamBuffer {
    /// Number of bytes currently staged
    fn available(&self) -> usize;

    /// Append bytes from the host link
    ///
    /// Returns how many bytes were accepted; the rest did not fit.
    fn stage(&mut self, data: &[u8]) -> usize;

    /// Move up to `chunk.len()` staged bytes into `chunk`, oldest first
    ///
    /// Returns the number of bytes moved. Moved bytes are no longer staged.
    fn drain_into(&mut self, chunk: &mut [u8]) -> usize;

    /// Discard everything staged
    fn flush(&mut self);

    /// Check if nothing is staged
    fn is_empty(&self) -> bool {
        self.available() == 0
    }
}
