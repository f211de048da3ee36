//! Report identifiers
//!
//! Opcodes for the I2C master interface. Channel 0 owns `0xA0..=0xA5`;
//! every further channel is shifted by [`I2C_CHANNEL_STRIDE`].

// Report IDs: I2C channel 0
pub const I2C0_INIT: u8 = 0xA0;
pub const I2C0_DEINIT: u8 = 0xA1;
pub const I2C0_WRITE: u8 = 0xA2;
pub const I2C0_READ: u8 = 0xA3;
pub const I2C0_WRITE_FROM_STREAM: u8 = 0xA4;
pub const I2C0_WRITE_THEN_READ: u8 = 0xA5;

/// First opcode of the I2C block (channel 0, init)
pub const I2C0_BASE: u8 = I2C0_INIT;

/// Opcode distance between consecutive I2C channels
pub const I2C_CHANNEL_STRIDE: u8 = 0x10;

/// Number of operations in one channel's opcode block
pub const I2C_OP_COUNT: u8 = 6;

/// Channel-relative I2C operation
///
/// The discriminant is the offset from the channel's base opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum I2cOp {
    /// Configure clock and pins
    Init = 0,
    /// Release the peripheral
    Deinit = 1,
    /// Single write with inline payload
    Write = 2,
    /// Single read into the response payload
    Read = 3,
    /// Start a streamed write fed from the staging buffer
    WriteFromStream = 4,
    /// Write then read with a repeated start
    WriteThenRead = 5,
}

impl I2cOp {
    /// Offset of this operation from a channel's base opcode
    pub const fn offset(self) -> u8 {
        self as u8
    }

    /// Operation at a channel-relative offset
    pub const fn from_offset(offset: u8) -> Option<Self> {
        match offset {
            0 => Some(I2cOp::Init),
            1 => Some(I2cOp::Deinit),
            2 => Some(I2cOp::Write),
            3 => Some(I2cOp::Read),
            4 => Some(I2cOp::WriteFromStream),
            5 => Some(I2cOp::WriteThenRead),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_zero_ids_match_offsets() {
        assert_eq!(I2C0_BASE + I2cOp::Init.offset(), I2C0_INIT);
        assert_eq!(I2C0_BASE + I2cOp::Deinit.offset(), I2C0_DEINIT);
        assert_eq!(I2C0_BASE + I2cOp::Write.offset(), I2C0_WRITE);
        assert_eq!(I2C0_BASE + I2cOp::Read.offset(), I2C0_READ);
        assert_eq!(
            I2C0_BASE + I2cOp::WriteFromStream.offset(),
            I2C0_WRITE_FROM_STREAM
        );
        assert_eq!(
            I2C0_BASE + I2cOp::WriteThenRead.offset(),
            I2C0_WRITE_THEN_READ
        );
    }

    #[test]
    fn test_from_offset_rejects_gap() {
        assert_eq!(I2cOp::from_offset(5), Some(I2cOp::WriteThenRead));
        assert_eq!(I2cOp::from_offset(I2C_OP_COUNT), None);
        assert_eq!(I2cOp::from_offset(0x0F), None);
    }
}
