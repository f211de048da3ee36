//! Host-side fakes for the hardware traits
//!
//! `FakeBus` records every call in order and answers from per-direction
//! scripts; an empty script means "transfer everything". `FakePins` keeps
//! the last function and pull configuration.

use std::collections::VecDeque;

use embedded_hal::i2c::{Error, ErrorKind, NoAcknowledgeSource};
use pontis_hal::{I2cBus, I2cConfig, I2cPins, Stop};

/// Scripted outcome of one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Move every requested byte
    Full,
    /// Move at most this many bytes, then stop acknowledging
    Short(usize),
    /// Address not acknowledged
    Nack,
    /// Other bus failure
    Bus,
}

/// Error returned by [`FakeBus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBusError {
    /// Address not acknowledged
    Nack,
    /// Other bus failure
    Bus,
}

impl Error for FakeBusError {
    fn kind(&self) -> ErrorKind {
        match self {
            FakeBusError::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            FakeBusError::Bus => ErrorKind::Bus,
        }
    }
}

/// One recorded bus call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Configure(I2cConfig),
    Disable,
    Write {
        address: u8,
        data: Vec<u8>,
        stop: Stop,
    },
    Read {
        address: u8,
        len: usize,
        stop: Stop,
    },
    RestartOnNext(bool),
}

/// Recording I2C bus
#[derive(Debug, Default)]
pub struct FakeBus {
    /// Every call, oldest first
    pub events: Vec<BusEvent>,
    write_replies: VecDeque<Reply>,
    read_replies: VecDeque<Reply>,
    read_data: VecDeque<u8>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next unscripted write
    pub fn script_write(&mut self, reply: Reply) {
        self.write_replies.push_back(reply);
    }

    /// Queue the outcome of the next unscripted read
    pub fn script_read(&mut self, reply: Reply) {
        self.read_replies.push_back(reply);
    }

    /// Bytes returned by subsequent reads; zeros once exhausted
    pub fn queue_read_data(&mut self, data: &[u8]) {
        self.read_data.extend(data.iter().copied());
    }

    /// Recorded writes as `(address, data, stop)`
    pub fn writes(&self) -> Vec<(u8, Vec<u8>, Stop)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Write {
                    address,
                    data,
                    stop,
                } => Some((*address, data.clone(), *stop)),
                _ => None,
            })
            .collect()
    }

    /// Recorded reads as `(address, len, stop)`
    pub fn reads(&self) -> Vec<(u8, usize, Stop)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Read { address, len, stop } => Some((*address, *len, *stop)),
                _ => None,
            })
            .collect()
    }

    /// Number of data transfers (writes and reads) issued
    pub fn transfer_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BusEvent::Write { .. } | BusEvent::Read { .. }))
            .count()
    }

    /// Last restart-on-next setting, if any was made
    pub fn last_restart(&self) -> Option<bool> {
        self.events.iter().rev().find_map(|e| match e {
            BusEvent::RestartOnNext(r) => Some(*r),
            _ => None,
        })
    }

    fn outcome(reply: Reply, requested: usize) -> Result<usize, FakeBusError> {
        match reply {
            Reply::Full => Ok(requested),
            Reply::Short(n) => Ok(n.min(requested)),
            Reply::Nack => Err(FakeBusError::Nack),
            Reply::Bus => Err(FakeBusError::Bus),
        }
    }
}

impl I2cBus for FakeBus {
    type Error = FakeBusError;

    fn configure(&mut self, config: &I2cConfig) {
        self.events.push(BusEvent::Configure(*config));
    }

    fn disable(&mut self) {
        self.events.push(BusEvent::Disable);
    }

    fn write(&mut self, address: u8, data: &[u8], stop: Stop) -> Result<usize, Self::Error> {
        self.events.push(BusEvent::Write {
            address,
            data: data.to_vec(),
            stop,
        });
        let reply = self.write_replies.pop_front().unwrap_or(Reply::Full);
        Self::outcome(reply, data.len())
    }

    fn read(&mut self, address: u8, buf: &mut [u8], stop: Stop) -> Result<usize, Self::Error> {
        self.events.push(BusEvent::Read {
            address,
            len: buf.len(),
            stop,
        });
        let reply = self.read_replies.pop_front().unwrap_or(Reply::Full);
        let count = Self::outcome(reply, buf.len())?;
        for slot in buf[..count].iter_mut() {
            *slot = self.read_data.pop_front().unwrap_or(0);
        }
        Ok(count)
    }

    fn set_restart_on_next(&mut self, restart: bool) {
        self.events.push(BusEvent::RestartOnNext(restart));
    }
}

/// Recording pin pair
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FakePins {
    /// Pins routed to the I2C block
    pub i2c_function: bool,
    /// Internal pull-ups enabled
    pub pull_ups: bool,
}

impl I2cPins for FakePins {
    fn select_i2c_function(&mut self) {
        self.i2c_function = true;
    }

    fn enable_pull_ups(&mut self) {
        self.pull_ups = true;
    }

    fn disable_pulls(&mut self) {
        self.pull_ups = false;
    }
}
