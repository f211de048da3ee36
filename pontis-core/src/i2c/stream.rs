//! Streamed write state machine
//!
//! A streamed write announces a total length up front, then the host link
//! stages the data piecewise. Every scheduler tick drains what has been
//! staged and writes it as one chunk. Chunks before the last suppress the
//! stop condition and the bus is told to append the next chunk to the held
//! transaction, so the target sees a single write of `total` bytes.

use pontis_hal::{I2cBus, Stop, StreamBuffer};

use super::error::TransferError;

/// Largest chunk written per tick
pub const STREAM_CHUNK_SIZE: usize = 512;

/// Streamed write state of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamState {
    /// No stream registered
    #[default]
    Idle,
    /// Waiting for or writing `remaining` more bytes to `address`
    Streaming { remaining: u32, address: u8 },
}

impl StreamState {
    /// Check if a stream is registered
    pub fn is_streaming(&self) -> bool {
        matches!(self, StreamState::Streaming { .. })
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamPoll {
    /// No stream registered
    NotConcerned,
    /// Stream still open, nothing to report
    InProgress,
    /// Last byte written with a stop condition
    Completed,
    /// A chunk failed; the stream was dropped
    Failed(TransferError),
}

/// Drains a [`StreamBuffer`] into the bus one chunk per tick
pub struct StreamWriteController<const CHUNK: usize = STREAM_CHUNK_SIZE> {
    state: StreamState,
    chunk: [u8; CHUNK],
}

impl<const CHUNK: usize> Default for StreamWriteController<CHUNK> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CHUNK: usize> StreamWriteController<CHUNK> {
    pub const fn new() -> Self {
        Self {
            state: StreamState::Idle,
            chunk: [0; CHUNK],
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Register a streamed write of `total` bytes to `address`
    ///
    /// Anything already staged is discarded. A zero total leaves the
    /// controller idle. An active stream is replaced.
    pub fn begin<S: StreamBuffer>(&mut self, address: u8, total: u32, buffer: &mut S) {
        buffer.flush();

        if let StreamState::Streaming {
            remaining,
            address: previous,
        } = self.state
        {
            log_warn!(
                "stream to 0x{:x} replaced with {} bytes outstanding",
                previous,
                remaining
            );
        }

        self.state = if total == 0 {
            StreamState::Idle
        } else {
            StreamState::Streaming {
                remaining: total,
                address,
            }
        };
        log_debug!("stream begin: 0x{:x}, {} bytes", address, total);
    }

    /// Advance the stream by at most one bus write
    pub fn poll<B: I2cBus, S: StreamBuffer>(&mut self, bus: &mut B, buffer: &mut S) -> StreamPoll {
        let (remaining, address) = match self.state {
            StreamState::Idle => return StreamPoll::NotConcerned,
            StreamState::Streaming { remaining, address } => (remaining, address),
        };

        if buffer.is_empty() {
            return StreamPoll::InProgress;
        }

        let staged = buffer.drain_into(&mut self.chunk);
        let len = staged.min(remaining as usize);
        if staged > len {
            log_warn!(
                "stream to 0x{:x}: {} staged bytes past the end dropped",
                address,
                staged - len
            );
        }

        // `len <= remaining`, so this cannot wrap
        let left = remaining - len as u32;
        let stop = Stop::from_send(left == 0);
        let result = TransferError::check(bus.write(address, &self.chunk[..len], stop), len);

        match result {
            Ok(_) if left > 0 => {
                self.state = StreamState::Streaming {
                    remaining: left,
                    address,
                };
                bus.set_restart_on_next(false);
                StreamPoll::InProgress
            }
            Ok(_) => {
                self.finish(bus);
                log_debug!("stream to 0x{:x} complete", address);
                StreamPoll::Completed
            }
            Err(e) => {
                self.finish(bus);
                log_warn!(
                    "stream to 0x{:x} failed with {} bytes outstanding: {:?}",
                    address,
                    remaining,
                    e
                );
                StreamPoll::Failed(e)
            }
        }
    }

    fn finish<B: I2cBus>(&mut self, bus: &mut B) {
        self.state = StreamState::Idle;
        bus.set_restart_on_next(true);
    }
}
