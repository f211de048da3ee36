//! Channel assembly

use pontis_core::config::ConfigError;
use pontis_core::{ChannelConfig, I2cMaster, OpcodeLayout, StagingBuffer};

use crate::i2c::Rp2040I2c;
use crate::pins::{I2cBlocks, PinBank, PinError, Rp2040I2cPins};

/// An I2C master channel on RP2040 hardware
pub type Rp2040Channel = I2cMaster<Rp2040I2c, Rp2040I2cPins, StagingBuffer>;

/// Error while assembling a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// Pin or block allocation failed
    Pins(PinError),
    /// Opcode layout rejected the channel
    Config(ConfigError),
}

impl From<PinError> for SetupError {
    fn from(e: PinError) -> Self {
        SetupError::Pins(e)
    }
}

impl From<ConfigError> for SetupError {
    fn from(e: ConfigError) -> Self {
        SetupError::Config(e)
    }
}

/// Take the block and pins of `config` and build an uninitialized channel
///
/// The bus stays disabled and the pins untouched until the host sends an
/// init command.
pub fn build_channel(
    config: &ChannelConfig,
    opcodes: OpcodeLayout,
    bank: &mut PinBank,
    blocks: &mut I2cBlocks,
) -> Result<Rp2040Channel, SetupError> {
    let pins = bank.take_i2c_pins(config)?;
    let bus = Rp2040I2c::new(blocks.take(config.index)?);
    I2cMaster::new(config, opcodes, bus, pins, StagingBuffer::new()).map_err(SetupError::from)
}
