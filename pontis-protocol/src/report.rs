//! Command and response reports.
//!
//! Report format:
//! - Fixed 64 bytes in both directions
//! - Command byte 0: opcode, already offset by channel index
//! - Response byte 0: opcode of the completed operation
//! - Response byte 1: [`CmdStatus`] code
//! - Response bytes 2..64: read payload
//!
//! Multi-byte integers are little-endian.

use core::ops::Range;

use crate::status::CmdStatus;

/// Size of every report in bytes
pub const REPORT_SIZE: usize = 64;

/// Offset of the status byte in a response
pub const RESPONSE_STATUS_OFFSET: usize = 1;

/// Offset of the read payload in a response
pub const RESPONSE_PAYLOAD_OFFSET: usize = 2;

/// Maximum read payload a response can carry
pub const RESPONSE_PAYLOAD_CAPACITY: usize = REPORT_SIZE - RESPONSE_PAYLOAD_OFFSET;

/// Errors that can occur when building a report from raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Input is longer than a report
    TooLong,
    /// Input is empty (no opcode)
    Empty,
}

/// A command report received from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    bytes: [u8; REPORT_SIZE],
}

impl CommandReport {
    /// Wrap a complete report
    pub const fn new(bytes: [u8; REPORT_SIZE]) -> Self {
        Self { bytes }
    }

    /// Build a report from a possibly short transfer
    ///
    /// Missing trailing bytes read as zero.
    pub fn from_slice(data: &[u8]) -> Result<Self, ReportError> {
        if data.is_empty() {
            return Err(ReportError::Empty);
        }
        if data.len() > REPORT_SIZE {
            return Err(ReportError::TooLong);
        }

        let mut bytes = [0u8; REPORT_SIZE];
        bytes[..data.len()].copy_from_slice(data);
        Ok(Self { bytes })
    }

    /// Create a zeroed report carrying only an opcode
    pub const fn with_opcode(opcode: u8) -> Self {
        let mut bytes = [0u8; REPORT_SIZE];
        bytes[0] = opcode;
        Self { bytes }
    }

    /// Opcode (byte 0)
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// Single parameter byte, zero past the end of the report
    pub fn u8_at(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0)
    }

    /// Little-endian `u32` parameter, zero-extended past the end of the report
    pub fn u32_le_at(&self, offset: usize) -> u32 {
        let mut raw = [0u8; 4];
        for (i, b) in raw.iter_mut().enumerate() {
            *b = self.u8_at(offset + i);
        }
        u32::from_le_bytes(raw)
    }

    /// Inline payload slice, `None` if it would run past the report
    pub fn payload(&self, range: Range<usize>) -> Option<&[u8]> {
        self.bytes.get(range)
    }

    /// Set a parameter byte (builder style)
    pub fn set_u8(mut self, offset: usize, value: u8) -> Self {
        if let Some(b) = self.bytes.get_mut(offset) {
            *b = value;
        }
        self
    }

    /// Set a little-endian `u32` parameter (builder style)
    pub fn set_u32_le(mut self, offset: usize, value: u32) -> Self {
        for (i, b) in value.to_le_bytes().iter().enumerate() {
            self = self.set_u8(offset + i, *b);
        }
        self
    }

    /// Copy an inline payload starting at `offset`, truncated at the report end
    pub fn set_payload(mut self, offset: usize, data: &[u8]) -> Self {
        if offset < REPORT_SIZE {
            let len = data.len().min(REPORT_SIZE - offset);
            self.bytes[offset..offset + len].copy_from_slice(&data[..len]);
        }
        self
    }

    /// Raw report bytes
    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.bytes
    }
}

/// A response report sent to the host
///
/// Bytes past the meaningful payload are not guaranteed to be zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseReport {
    bytes: [u8; REPORT_SIZE],
}

impl Default for ResponseReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseReport {
    /// Create an empty response
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; REPORT_SIZE],
        }
    }

    /// Opcode of the completed operation (byte 0)
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// Set the opcode of the completed operation
    pub fn set_opcode(&mut self, opcode: u8) {
        self.bytes[0] = opcode;
    }

    /// Status code (byte 1), `None` if not a known code
    pub fn status(&self) -> Option<CmdStatus> {
        CmdStatus::from_u8(self.bytes[RESPONSE_STATUS_OFFSET])
    }

    /// Set the status code
    pub fn set_status(&mut self, status: CmdStatus) {
        self.bytes[RESPONSE_STATUS_OFFSET] = status.as_u8();
    }

    /// Read payload area
    pub fn payload(&self) -> &[u8] {
        &self.bytes[RESPONSE_PAYLOAD_OFFSET..]
    }

    /// Mutable read payload area
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[RESPONSE_PAYLOAD_OFFSET..]
    }

    /// Raw report bytes
    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.bytes
    }
}
