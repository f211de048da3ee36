//! I2C bus abstractions
//!
//! Provides the blocking I2C master capability used by the bridge. Unlike a
//! plain `embedded-hal` bus, every transfer states whether it ends with a
//! stop condition, because streamed writes keep one transaction open across
//! several calls.

/// Trailing condition of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stop {
    /// Release the bus with a stop condition after the last byte
    Send,
    /// Keep the bus held so the next transfer continues the transaction
    Suppress,
}

impl Stop {
    /// Stop policy from a "send stop" flag
    pub const fn from_send(send: bool) -> Self {
        if send {
            Stop::Send
        } else {
            Stop::Suppress
        }
    }

    /// Whether a stop condition is sent
    pub const fn is_sent(self) -> bool {
        matches!(self, Stop::Send)
    }
}

/// I2C bus master
///
/// Blocking addressed transfers. Implementations report how many bytes were
/// actually moved; a count lower than requested without an error means the
/// target stopped acknowledging data mid-transfer. An address NACK must be
/// reported as an error whose [`embedded_hal::i2c::Error::kind`] is
/// `NoAcknowledge`.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error: embedded_hal::i2c::Error;

    /// Enable the peripheral as a master at the given configuration
    fn configure(&mut self, config: &I2cConfig);

    /// Disable the peripheral
    fn disable(&mut self);

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    /// * `stop` - Whether the transfer ends with a stop condition
    ///
    /// Returns the number of bytes written.
    fn write(&mut self, address: u8, data: &[u8], stop: Stop) -> Result<usize, Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into; its length is the requested count
    /// * `stop` - Whether the transfer ends with a stop condition
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, address: u8, buf: &mut [u8], stop: Stop) -> Result<usize, Self::Error>;

    /// Choose how the next transfer begins
    ///
    /// After a transfer with [`Stop::Suppress`] the bus is still held. With
    /// `restart == true` the next transfer opens with a repeated start; with
    /// `false` its bytes are appended to the held transaction as if they
    /// were part of the previous transfer.
    fn set_restart_on_next(&mut self, restart: bool);
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100kHz standard mode
        }
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        frequency: 1_000_000,
    };

    /// Configuration at an arbitrary clock rate
    pub const fn with_frequency(frequency: u32) -> Self {
        Self { frequency }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_from_send_flag() {
        assert_eq!(Stop::from_send(true), Stop::Send);
        assert_eq!(Stop::from_send(false), Stop::Suppress);
        assert!(Stop::Send.is_sent());
        assert!(!Stop::Suppress.is_sent());
    }

    #[test]
    fn test_config_presets() {
        assert_eq!(I2cConfig::default(), I2cConfig::STANDARD);
        assert_eq!(I2cConfig::with_frequency(400_000), I2cConfig::FAST);
        assert_eq!(I2cConfig::FAST_PLUS.frequency, 1_000_000);
    }
}
