//! Cooperative scheduler
//!
//! The bridge owns nothing but a list of interfaces. The firmware loop hands
//! each received report to [`Bridge::handle_command`] and calls
//! [`Bridge::poll`] once per iteration to advance background work.

use heapless::Vec;
use pontis_protocol::{CmdStatus, CommandReport, ResponseReport};

use crate::config::ConfigError;
use crate::interface::Interface;

/// Maximum interfaces per bridge
pub const MAX_INTERFACES: usize = 4;

/// Routes command reports to interfaces and ticks them
pub struct Bridge<'a, const N: usize = MAX_INTERFACES> {
    interfaces: Vec<&'a mut dyn Interface, N>,
}

impl<'a, const N: usize> Default for Bridge<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> Bridge<'a, N> {
    pub const fn new() -> Self {
        Self {
            interfaces: Vec::new(),
        }
    }

    /// Add an interface; commands are offered in registration order
    pub fn register(&mut self, interface: &'a mut dyn Interface) -> Result<(), ConfigError> {
        self.interfaces
            .push(interface)
            .map_err(|_| ConfigError::TooManyChannels)
    }

    /// Number of registered interfaces
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Process one command report
    ///
    /// The first interface that is concerned handles the command. The
    /// response echoes the command opcode and carries the status; an
    /// opcode nobody handles answers [`CmdStatus::NotConcerned`].
    pub fn handle_command(&mut self, cmd: &CommandReport) -> ResponseReport {
        let mut response = ResponseReport::new();
        let mut status = CmdStatus::NotConcerned;

        for interface in self.interfaces.iter_mut() {
            status = interface.process(cmd, &mut response);
            if status.is_concerned() {
                break;
            }
        }

        if !status.is_concerned() {
            log_debug!("opcode 0x{:x} not handled", cmd.opcode());
        }

        response.set_opcode(cmd.opcode());
        response.set_status(status);
        response
    }

    /// Hand streamed data to the interface registered at `slot`
    ///
    /// Returns how many bytes were accepted.
    pub fn stage(&mut self, slot: usize, data: &[u8]) -> usize {
        match self.interfaces.get_mut(slot) {
            Some(interface) => interface.stage(data),
            None => 0,
        }
    }

    /// Tick every interface once
    ///
    /// Returns the completion responses produced during this tick.
    pub fn poll(&mut self) -> Vec<ResponseReport, N> {
        let mut completed = Vec::new();

        for interface in self.interfaces.iter_mut() {
            let mut response = ResponseReport::new();
            let status = interface.task(&mut response);
            if status.has_response() {
                response.set_status(status);
                // One response per interface at most, so this always fits
                let _ = completed.push(response);
            }
        }

        completed
    }
}
