//! Transfer failure classification

use embedded_hal::i2c::{Error, ErrorKind};

/// Why a transfer failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError {
    /// Target did not acknowledge
    Nack,
    /// Driver moved fewer bytes than requested without a NACK
    Short { expected: usize, actual: usize },
    /// Any other bus error (arbitration loss, overrun, timeout)
    Bus,
    /// Requested length does not fit the report
    Oversized { requested: usize, capacity: usize },
}

impl TransferError {
    /// Classify a driver result against the expected byte count
    pub fn check<E: Error>(result: Result<usize, E>, expected: usize) -> Result<usize, Self> {
        match result {
            Ok(actual) if actual == expected => Ok(actual),
            Ok(actual) => Err(TransferError::Short { expected, actual }),
            Err(e) => Err(Self::from_kind(e.kind())),
        }
    }

    /// Map a driver error kind
    pub fn from_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => TransferError::Nack,
            _ => TransferError::Bus,
        }
    }
}

/// Direction of the transfer that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Master to target
    Write,
    /// Target to master
    Read,
}

/// A failed transaction, tagged with the phase that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransactionError {
    /// Phase that failed
    pub phase: Phase,
    /// Failure class
    pub error: TransferError,
}

impl TransactionError {
    /// Failure during the write phase
    pub const fn write(error: TransferError) -> Self {
        Self {
            phase: Phase::Write,
            error,
        }
    }

    /// Failure during the read phase
    pub const fn read(error: TransferError) -> Self {
        Self {
            phase: Phase::Read,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::FakeBusError;

    #[test]
    fn test_exact_count_is_success() {
        assert_eq!(TransferError::check::<FakeBusError>(Ok(4), 4), Ok(4));
    }

    #[test]
    fn test_short_count() {
        assert_eq!(
            TransferError::check::<FakeBusError>(Ok(2), 4),
            Err(TransferError::Short {
                expected: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn test_nack_distinct_from_bus_error() {
        assert_eq!(
            TransferError::check(Err(FakeBusError::Nack), 1),
            Err(TransferError::Nack)
        );
        assert_eq!(
            TransferError::check(Err(FakeBusError::Bus), 1),
            Err(TransferError::Bus)
        );
    }
}
