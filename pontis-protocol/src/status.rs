//! Command status codes
//!
//! Every interface entry point answers with one of these. The bridge copies
//! the code into byte 1 of the response.

/// Outcome of processing a command or a scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CmdStatus {
    /// Operation succeeded
    Ok = 0x01,
    /// Transaction-level failure
    Nok = 0x02,
    /// Opcode not handled by this interface
    NotConcerned = 0x03,
    /// Streamed operation still in progress, no response this tick
    NotFinished = 0x04,
}

impl CmdStatus {
    /// Get the status as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a status from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(CmdStatus::Ok),
            0x02 => Some(CmdStatus::Nok),
            0x03 => Some(CmdStatus::NotConcerned),
            0x04 => Some(CmdStatus::NotFinished),
            _ => None,
        }
    }

    /// Map a success flag onto `Ok`/`Nok`
    pub fn from_success(success: bool) -> Self {
        if success {
            CmdStatus::Ok
        } else {
            CmdStatus::Nok
        }
    }

    /// Check if the interface handled the command
    pub fn is_concerned(self) -> bool {
        !matches!(self, CmdStatus::NotConcerned)
    }

    /// Check if this status carries a response to send
    pub fn has_response(self) -> bool {
        matches!(self, CmdStatus::Ok | CmdStatus::Nok)
    }
}
