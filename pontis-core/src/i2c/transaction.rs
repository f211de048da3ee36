//! Single-shot I2C transactions
//!
//! Each call is one blocking exchange with the bus driver. Results are
//! classified into [`TransferError`] so that callers can tell an address
//! NACK from a target that stopped acknowledging data.

use pontis_hal::{I2cBus, Stop};

use super::error::{TransactionError, TransferError};

/// Executes write, read and write-then-read transactions on a bus
pub struct TransactionExecutor<'a, B: I2cBus> {
    bus: &'a mut B,
}

impl<'a, B: I2cBus> TransactionExecutor<'a, B> {
    /// Borrow a bus for the duration of one or more transactions
    pub fn new(bus: &'a mut B) -> Self {
        Self { bus }
    }

    /// Addressed write of `len` bytes from `inline`
    ///
    /// A length beyond `inline.len()` is truncated to it and the stop
    /// condition is sent whatever `stop` says. Returns the bytes written.
    pub fn write(
        &mut self,
        address: u8,
        stop: Stop,
        len: usize,
        inline: &[u8],
    ) -> Result<usize, TransferError> {
        let (data, stop) = if len > inline.len() {
            log_warn!(
                "i2c 0x{:x}: write of {} bytes truncated to {}",
                address,
                len,
                inline.len()
            );
            (inline, Stop::Send)
        } else {
            (&inline[..len], stop)
        };

        let result = TransferError::check(self.bus.write(address, data, stop), data.len());
        if let Err(e) = result {
            log_warn!("i2c 0x{:x}: write failed: {:?}", address, e);
        }
        result
    }

    /// Addressed read of exactly `len` bytes into the front of `out`
    pub fn read(
        &mut self,
        address: u8,
        stop: Stop,
        len: usize,
        out: &mut [u8],
    ) -> Result<usize, TransferError> {
        if len > out.len() {
            log_warn!(
                "i2c 0x{:x}: read of {} bytes exceeds {}",
                address,
                len,
                out.len()
            );
            return Err(TransferError::Oversized {
                requested: len,
                capacity: out.len(),
            });
        }

        let result = TransferError::check(self.bus.read(address, &mut out[..len], stop), len);
        if let Err(e) = result {
            log_warn!("i2c 0x{:x}: read failed: {:?}", address, e);
        }
        result
    }

    /// Write `write_len` bytes holding the bus, then read `read_len` bytes
    ///
    /// The read is only issued after a complete write phase. Both lengths
    /// are checked before any bus activity.
    pub fn write_then_read(
        &mut self,
        address: u8,
        read_stop: Stop,
        write_len: usize,
        inline: &[u8],
        read_len: usize,
        out: &mut [u8],
    ) -> Result<usize, TransactionError> {
        if write_len > inline.len() {
            log_warn!(
                "i2c 0x{:x}: write-then-read write phase of {} bytes exceeds {}",
                address,
                write_len,
                inline.len()
            );
            return Err(TransactionError::write(TransferError::Oversized {
                requested: write_len,
                capacity: inline.len(),
            }));
        }
        if read_len > out.len() {
            log_warn!(
                "i2c 0x{:x}: write-then-read read phase of {} bytes exceeds {}",
                address,
                read_len,
                out.len()
            );
            return Err(TransactionError::read(TransferError::Oversized {
                requested: read_len,
                capacity: out.len(),
            }));
        }

        let data = &inline[..write_len];
        TransferError::check(self.bus.write(address, data, Stop::Suppress), write_len).map_err(
            |e| {
                log_warn!("i2c 0x{:x}: write-then-read write phase failed: {:?}", address, e);
                TransactionError::write(e)
            },
        )?;

        TransferError::check(
            self.bus.read(address, &mut out[..read_len], read_stop),
            read_len,
        )
        .map_err(|e| {
            log_warn!("i2c 0x{:x}: write-then-read read phase failed: {:?}", address, e);
            TransactionError::read(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::error::Phase;
    use crate::mock::{FakeBus, Reply};

    #[test]
    fn test_write_sends_requested_length() {
        let mut bus = FakeBus::new();
        let inline = [1, 2, 3, 4, 5];
        let result = TransactionExecutor::new(&mut bus).write(0x50, Stop::Suppress, 3, &inline);

        assert_eq!(result, Ok(3));
        assert_eq!(bus.writes(), vec![(0x50, vec![1, 2, 3], Stop::Suppress)]);
    }

    #[test]
    fn test_oversized_write_truncated_with_stop() {
        let mut bus = FakeBus::new();
        let inline = [0xAA; 57];
        let result = TransactionExecutor::new(&mut bus).write(0x50, Stop::Suppress, 200, &inline);

        assert_eq!(result, Ok(57));
        let writes = bus.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1.len(), 57);
        assert_eq!(writes[0].2, Stop::Send);
    }

    #[test]
    fn test_write_nack_and_short_distinguished() {
        let mut bus = FakeBus::new();
        bus.script_write(Reply::Nack);
        bus.script_write(Reply::Short(1));
        let inline = [0u8; 8];

        let mut exec = TransactionExecutor::new(&mut bus);
        assert_eq!(
            exec.write(0x20, Stop::Send, 4, &inline),
            Err(TransferError::Nack)
        );
        assert_eq!(
            exec.write(0x20, Stop::Send, 4, &inline),
            Err(TransferError::Short {
                expected: 4,
                actual: 1
            })
        );
    }

    #[test]
    fn test_read_fills_output() {
        let mut bus = FakeBus::new();
        bus.queue_read_data(&[9, 8, 7]);
        let mut out = [0u8; 62];

        let result = TransactionExecutor::new(&mut bus).read(0x48, Stop::Send, 3, &mut out);
        assert_eq!(result, Ok(3));
        assert_eq!(&out[..4], &[9, 8, 7, 0]);
        assert_eq!(bus.reads(), vec![(0x48, 3, Stop::Send)]);
    }

    #[test]
    fn test_read_too_long_touches_nothing() {
        let mut bus = FakeBus::new();
        let mut out = [0u8; 62];

        let result = TransactionExecutor::new(&mut bus).read(0x48, Stop::Send, 63, &mut out);
        assert_eq!(
            result,
            Err(TransferError::Oversized {
                requested: 63,
                capacity: 62
            })
        );
        assert!(bus.events.is_empty());
    }

    #[test]
    fn test_write_then_read_sequence() {
        let mut bus = FakeBus::new();
        bus.queue_read_data(&[0x12, 0x34]);
        let inline = [0x3B, 0, 0];
        let mut out = [0u8; 62];

        let result = TransactionExecutor::new(&mut bus).write_then_read(
            0x68,
            Stop::Send,
            1,
            &inline,
            2,
            &mut out,
        );
        assert_eq!(result, Ok(2));
        assert_eq!(&out[..2], &[0x12, 0x34]);
        assert_eq!(bus.writes(), vec![(0x68, vec![0x3B], Stop::Suppress)]);
        assert_eq!(bus.reads(), vec![(0x68, 2, Stop::Send)]);
    }

    #[test]
    fn test_short_write_phase_skips_read() {
        let mut bus = FakeBus::new();
        bus.script_write(Reply::Short(1));
        let inline = [1, 2, 3];
        let mut out = [0u8; 62];

        let result = TransactionExecutor::new(&mut bus).write_then_read(
            0x68,
            Stop::Send,
            3,
            &inline,
            4,
            &mut out,
        );
        assert_eq!(
            result,
            Err(TransactionError::write(TransferError::Short {
                expected: 3,
                actual: 1
            }))
        );
        assert!(bus.reads().is_empty());
    }

    #[test]
    fn test_read_phase_failure_is_tagged() {
        let mut bus = FakeBus::new();
        bus.script_read(Reply::Nack);
        let inline = [1];
        let mut out = [0u8; 62];

        let err = TransactionExecutor::new(&mut bus)
            .write_then_read(0x68, Stop::Suppress, 1, &inline, 2, &mut out)
            .unwrap_err();
        assert_eq!(err.phase, Phase::Read);
        assert_eq!(err.error, TransferError::Nack);
        assert_eq!(bus.transfer_count(), 2);
    }

    #[test]
    fn test_write_then_read_lengths_checked_first() {
        let mut bus = FakeBus::new();
        let inline = [0u8; 59];
        let mut out = [0u8; 62];

        let mut exec = TransactionExecutor::new(&mut bus);
        let err = exec
            .write_then_read(0x68, Stop::Send, 60, &inline, 1, &mut out)
            .unwrap_err();
        assert_eq!(err.phase, Phase::Write);

        let err = exec
            .write_then_read(0x68, Stop::Send, 1, &inline, 63, &mut out)
            .unwrap_err();
        assert_eq!(err.phase, Phase::Read);

        assert!(bus.events.is_empty());
    }
}
