//! Interface abstraction
//!
//! Every bridged peripheral (one per I2C channel today) is an interface the
//! scheduler offers each command to and ticks once per loop iteration.

use pontis_protocol::{CmdStatus, CommandReport, ResponseReport};

/// Lifecycle state of an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceState {
    /// Peripheral released; transactions are undefined
    #[default]
    NotInitialized,
    /// Peripheral configured and usable
    Initialized,
}

impl InterfaceState {
    /// Check if the interface has been initialized
    pub fn is_initialized(self) -> bool {
        matches!(self, InterfaceState::Initialized)
    }
}

/// A command-driven interface polled by the [`Bridge`](crate::Bridge)
pub trait Interface {
    /// Handle a command report
    ///
    /// Returns [`CmdStatus::NotConcerned`] without side effects when the
    /// opcode belongs to someone else. Read payloads are written into
    /// `response`; the caller fills in opcode and status bytes.
    fn process(&mut self, cmd: &CommandReport, response: &mut ResponseReport) -> CmdStatus;

    /// Advance background work by one scheduler tick
    ///
    /// Returns [`CmdStatus::NotConcerned`] when idle and
    /// [`CmdStatus::NotFinished`] while work is pending. `Ok`/`Nok` mean a
    /// completion response has been written into `response` (opcode set).
    fn task(&mut self, response: &mut ResponseReport) -> CmdStatus;

    /// Accept streamed data from the host link
    ///
    /// Returns how many bytes were taken. Interfaces without a streamed
    /// input take nothing.
    fn stage(&mut self, _data: &[u8]) -> usize {
        0
    }

    /// Current lifecycle state
    fn state(&self) -> InterfaceState;
}
