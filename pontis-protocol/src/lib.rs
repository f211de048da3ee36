//! Host Report Protocol
//!
//! This crate defines the fixed-size reports exchanged between the host and
//! the bridge. The host link delivers one command report and expects one
//! response report per call; streamed writes additionally produce one
//! unsolicited completion response when the stream ends.
//!
//! # Report Layout
//!
//! Both directions use 64-byte reports:
//! ```text
//! Command:  ┌────────┬──────────────────────────────────────┐
//!           │ OPCODE │ PARAMETERS (operation specific)      │
//!           │ 1B     │ 63B                                  │
//!           └────────┴──────────────────────────────────────┘
//! Response: ┌────────┬────────┬─────────────────────────────┐
//!           │ OPCODE │ STATUS │ PAYLOAD                     │
//!           │ 1B     │ 1B     │ 62B                         │
//!           └────────┴────────┴─────────────────────────────┘
//! ```
//!
//! Opcodes of channel-based interfaces are offset by the channel index
//! times a fixed stride, so `0xA2` is "I2C write" on channel 0 and `0xB2`
//! the same on channel 1.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod ids;
pub mod report;
pub mod status;

pub use ids::{I2cOp, I2C0_BASE, I2C_CHANNEL_STRIDE};
pub use report::{CommandReport, ReportError, ResponseReport, REPORT_SIZE};
pub use status::CmdStatus;
