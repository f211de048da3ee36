//! RP2040-specific HAL for the I2C bridge firmware
//!
//! This crate provides RP2040 implementations of the shared `pontis-hal`
//! traits:
//!
//! - Blocking I2C master with per-transfer stop and restart control
//! - Config-driven pin allocation and pad configuration
//! - Channel assembly from a [`ChannelConfig`](pontis_core::ChannelConfig)

#![no_std]

pub mod channel;
pub mod i2c;
pub mod pins;

pub use channel::{build_channel, Rp2040Channel, SetupError};
pub use i2c::{Error as I2cError, I2cBlock, Rp2040I2c};
pub use pins::{split, I2cBlocks, PinBank, PinError, Rp2040I2cPins};
