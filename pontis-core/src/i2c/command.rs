//! Channel-relative command decoding
//!
//! Pure functions from `(channel, report)` to a typed command. Opcodes
//! outside the channel's block decode to `None`; the dispatcher is shared
//! with other channels and interfaces, so this is the normal case rather
//! than an error.

use pontis_hal::Stop;
use pontis_protocol::report::REPORT_SIZE;
use pontis_protocol::{CommandReport, I2cOp};

use crate::config::OpcodeLayout;

/// Offset of the inline payload of a write command
pub const WRITE_PAYLOAD_OFFSET: usize = 7;

/// Offset of the inline payload of a write-then-read command
pub const WRITE_READ_PAYLOAD_OFFSET: usize = 5;

/// Largest inline payload of a single write
pub const INLINE_WRITE_CAPACITY: usize = REPORT_SIZE - WRITE_PAYLOAD_OFFSET;

/// Largest inline payload of the write phase of a write-then-read
pub const WRITE_READ_CAPACITY: usize = REPORT_SIZE - WRITE_READ_PAYLOAD_OFFSET;

/// Stop flag value requesting a stop condition
const STOP_FLAG_SEND: u8 = 0x01;

/// A decoded I2C command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cCommand<'a> {
    /// Configure clock and pins
    Init { baudrate: u32, pull_ups: bool },
    /// Release the peripheral
    Deinit,
    /// Single write; `len` is the requested length, `payload` the whole
    /// inline area
    Write {
        address: u8,
        stop: Stop,
        len: usize,
        payload: &'a [u8],
    },
    /// Single read of `len` bytes
    Read { address: u8, stop: Stop, len: usize },
    /// Start a streamed write of `total` bytes
    WriteFromStream { address: u8, total: u32 },
    /// Write `write_len` inline bytes, then read `read_len` bytes
    WriteThenRead {
        address: u8,
        read_stop: Stop,
        write_len: usize,
        payload: &'a [u8],
        read_len: usize,
    },
}

/// Map an opcode to the operation it selects on a channel
pub fn decode_op(layout: &OpcodeLayout, channel: u8, opcode: u8) -> Option<I2cOp> {
    let base = layout.channel_base(channel)?;
    let offset = opcode.checked_sub(base)?;
    I2cOp::from_offset(offset)
}

fn stop_flag(byte: u8) -> Stop {
    Stop::from_send(byte == STOP_FLAG_SEND)
}

impl<'a> I2cCommand<'a> {
    /// Extract the parameters of `op` from a report
    pub fn parse(op: I2cOp, report: &'a CommandReport) -> Self {
        let bytes = report.as_bytes();
        match op {
            I2cOp::Init => I2cCommand::Init {
                baudrate: report.u32_le_at(2),
                pull_ups: report.u8_at(1) != 0,
            },
            I2cOp::Deinit => I2cCommand::Deinit,
            I2cOp::Write => I2cCommand::Write {
                address: report.u8_at(1),
                stop: stop_flag(report.u8_at(2)),
                len: report.u32_le_at(3) as usize,
                payload: &bytes[WRITE_PAYLOAD_OFFSET..],
            },
            I2cOp::Read => I2cCommand::Read {
                address: report.u8_at(1),
                stop: stop_flag(report.u8_at(2)),
                len: report.u8_at(3) as usize,
            },
            I2cOp::WriteFromStream => I2cCommand::WriteFromStream {
                address: report.u8_at(1),
                total: report.u32_le_at(2),
            },
            I2cOp::WriteThenRead => I2cCommand::WriteThenRead {
                address: report.u8_at(1),
                read_stop: stop_flag(report.u8_at(2)),
                write_len: report.u8_at(3) as usize,
                payload: &bytes[WRITE_READ_PAYLOAD_OFFSET..],
                read_len: report.u8_at(4) as usize,
            },
        }
    }

    /// Decode a report addressed to `channel`
    pub fn decode(layout: &OpcodeLayout, channel: u8, report: &'a CommandReport) -> Option<Self> {
        decode_op(layout, channel, report.opcode()).map(|op| Self::parse(op, report))
    }
}
