//! Stream staging buffer
//!
//! Bounded FIFO the host link fills with streamed write data. The I2C side
//! drains it through the [`StreamBuffer`] trait.

use heapless::Deque;
use pontis_hal::StreamBuffer;

/// Default staging capacity per channel
pub const STAGING_CAPACITY: usize = 512;

/// Heapless staging buffer
#[derive(Debug)]
pub struct StagingBuffer<const N: usize = STAGING_CAPACITY> {
    queue: Deque<u8, N>,
}

impl<const N: usize> Default for StagingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> StagingBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    /// Free space in bytes
    pub fn free(&self) -> usize {
        N - self.queue.len()
    }

    /// Total capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> StreamBuffer for StagingBuffer<N> {
    fn available(&self) -> usize {
        self.queue.len()
    }

    fn stage(&mut self, data: &[u8]) -> usize {
        let mut accepted = 0;
        for &byte in data {
            if self.queue.push_back(byte).is_err() {
                break;
            }
            accepted += 1;
        }
        accepted
    }

    fn drain_into(&mut self, chunk: &mut [u8]) -> usize {
        let mut moved = 0;
        for slot in chunk.iter_mut() {
            match self.queue.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    moved += 1;
                }
                None => break,
            }
        }
        moved
    }

    fn flush(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_stops_when_full() {
        let mut buf = StagingBuffer::<4>::new();
        assert_eq!(buf.stage(&[1, 2, 3]), 3);
        assert_eq!(buf.stage(&[4, 5, 6]), 1);
        assert_eq!(buf.available(), 4);
        assert_eq!(buf.free(), 0);
    }

    #[test]
    fn test_drain_preserves_order() {
        let mut buf = StagingBuffer::<8>::new();
        buf.stage(&[10, 20, 30, 40, 50]);

        let mut chunk = [0u8; 3];
        assert_eq!(buf.drain_into(&mut chunk), 3);
        assert_eq!(chunk, [10, 20, 30]);

        assert_eq!(buf.drain_into(&mut chunk), 2);
        assert_eq!(&chunk[..2], &[40, 50]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_drain_after_wraparound() {
        let mut buf = StagingBuffer::<4>::new();
        let mut chunk = [0u8; 4];

        buf.stage(&[1, 2, 3]);
        buf.drain_into(&mut chunk[..2]);
        buf.stage(&[4, 5, 6]);

        assert_eq!(buf.drain_into(&mut chunk), 4);
        assert_eq!(chunk, [3, 4, 5, 6]);
    }

    #[test]
    fn test_flush_discards_everything() {
        let mut buf = StagingBuffer::<8>::new();
        buf.stage(&[1, 2, 3]);
        buf.flush();
        assert!(buf.is_empty());
        assert_eq!(buf.free(), buf.capacity());
    }
}
