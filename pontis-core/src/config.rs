//! Bridge configuration
//!
//! Board-agnostic description of the I2C channels and their opcode blocks.
//! With the `serde` feature the configuration can be stored as postcard
//! binary data.

use heapless::Vec;
use pontis_protocol::ids::I2C_OP_COUNT;
use pontis_protocol::{I2cOp, I2C0_BASE, I2C_CHANNEL_STRIDE};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum I2C channels per bridge (the RP2040 has two I2C blocks)
pub const MAX_CHANNELS: usize = 2;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Two channels share an index
    DuplicateChannel(u8),
    /// A channel's opcode block does not fit in a byte
    OpcodeOverflow(u8),
    /// Stride smaller than one opcode block, channels would overlap
    OverlappingChannels,
    /// More channels than [`MAX_CHANNELS`]
    TooManyChannels,
    /// Serialization failed
    Encode,
    /// Deserialization failed
    Decode,
}

/// Placement of the per-channel opcode blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpcodeLayout {
    /// Base opcode of channel 0
    pub base: u8,
    /// Distance between consecutive channels
    pub stride: u8,
}

impl Default for OpcodeLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl OpcodeLayout {
    /// Host protocol layout: channel 0 at 0xA0, channel 1 at 0xB0
    pub const DEFAULT: Self = Self {
        base: I2C0_BASE,
        stride: I2C_CHANNEL_STRIDE,
    };

    /// Base opcode of a channel, `None` if it does not fit in a byte
    pub fn channel_base(&self, channel: u8) -> Option<u8> {
        let base = self.base as u16 + channel as u16 * self.stride as u16;
        u8::try_from(base).ok()
    }

    /// Absolute opcode of an operation on a channel
    pub fn opcode(&self, channel: u8, op: I2cOp) -> Option<u8> {
        self.channel_base(channel)?.checked_add(op.offset())
    }

    /// Check that the whole opcode block of a channel fits in a byte
    pub fn block_fits(&self, channel: u8) -> bool {
        self.channel_base(channel)
            .and_then(|base| base.checked_add(I2C_OP_COUNT - 1))
            .is_some()
    }
}

/// One I2C channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelConfig {
    /// Hardware block index (0 or 1 on RP2040)
    pub index: u8,
    /// SDA GPIO number
    pub sda_pin: u8,
    /// SCL GPIO number
    pub scl_pin: u8,
}

impl ChannelConfig {
    /// I2C0 on the Raspberry Pi Pico header (GP4/GP5)
    pub const I2C0: Self = Self {
        index: 0,
        sda_pin: 4,
        scl_pin: 5,
    };

    /// I2C1 on the Raspberry Pi Pico header (GP14/GP15)
    pub const I2C1: Self = Self {
        index: 1,
        sda_pin: 14,
        scl_pin: 15,
    };
}

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeConfig {
    /// Opcode block placement
    pub opcodes: OpcodeLayout,
    /// Enabled channels
    pub channels: Vec<ChannelConfig, MAX_CHANNELS>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let mut channels = Vec::new();
        let _ = channels.push(ChannelConfig::I2C0);
        let _ = channels.push(ChannelConfig::I2C1);
        Self {
            opcodes: OpcodeLayout::DEFAULT,
            channels,
        }
    }
}

impl BridgeConfig {
    /// Build a configuration from a channel list
    pub fn new(opcodes: OpcodeLayout, channels: &[ChannelConfig]) -> Result<Self, ConfigError> {
        let mut list = Vec::new();
        list.extend_from_slice(channels)
            .map_err(|_| ConfigError::TooManyChannels)?;
        let config = Self {
            opcodes,
            channels: list,
        };
        config.validate()?;
        Ok(config)
    }

    /// Find a channel by hardware index
    pub fn channel(&self, index: u8) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.index == index)
    }

    /// Check channel uniqueness and opcode ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, channel) in self.channels.iter().enumerate() {
            if self.channels[..i].iter().any(|c| c.index == channel.index) {
                return Err(ConfigError::DuplicateChannel(channel.index));
            }
            if !self.opcodes.block_fits(channel.index) {
                return Err(ConfigError::OpcodeOverflow(channel.index));
            }
        }
        if self.channels.len() > 1 && self.opcodes.stride < I2C_OP_COUNT {
            return Err(ConfigError::OverlappingChannels);
        }
        Ok(())
    }

    /// Serialize to postcard binary
    ///
    /// Returns the used part of `buf`.
    #[cfg(feature = "serde")]
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encode)
    }

    /// Deserialize from postcard binary and validate
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }
}
