//! Pontis Hardware Abstraction Layer
//!
//! This crate defines the hardware capabilities the bridge core needs from
//! a chip-specific HAL. The core never touches registers; it drives these
//! traits, which keeps the command and streaming logic testable on the host
//! with fake implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Bridge logic (pontis-core)             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pontis-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │  pontis-hal-    │
//!            │     rp2040      │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - Blocking I2C master transfers with explicit stop control
//! - [`gpio::I2cPins`] - SDA/SCL function selection and pull-ups
//! - [`stream::StreamBuffer`] - Staging buffer drained by streamed writes

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod stream;

// Re-export key traits at crate root for convenience
pub use gpio::I2cPins;
pub use i2c::{I2cBus, I2cConfig, Stop};
pub use stream::StreamBuffer;
