//! Board-agnostic core logic for the I2C bridge firmware
//!
//! This crate contains all bridge logic that does not depend on
//! specific hardware implementations:
//!
//! - Per-channel interface state (initialized or not)
//! - Single-shot I2C transactions and their failure classification
//! - Streamed writes drained from a staging buffer across scheduler ticks
//! - Channel-relative command decoding
//! - The cooperative scheduler that routes reports to interfaces
//! - Configuration type definitions

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod logging;

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod i2c;
pub mod interface;

#[cfg(any(test, feature = "std"))]
pub mod mock;

pub use bridge::Bridge;
pub use buffer::StagingBuffer;
pub use config::{BridgeConfig, ChannelConfig, OpcodeLayout};
pub use i2c::I2cMaster;
pub use interface::{Interface, InterfaceState};
