//! Per-channel initialization state

use pontis_hal::{I2cBus, I2cConfig, I2cPins};

use crate::interface::InterfaceState;

/// Tracks whether a channel's peripheral and pins are set up
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceStateTracker {
    state: InterfaceState,
}

impl InterfaceStateTracker {
    pub const fn new() -> Self {
        Self {
            state: InterfaceState::NotInitialized,
        }
    }

    pub fn state(&self) -> InterfaceState {
        self.state
    }

    /// Configure the bus clock and route the pins to it
    ///
    /// Pull-ups are only touched when requested; re-initializing an
    /// initialized channel just reconfigures it.
    pub fn init<B: I2cBus, P: I2cPins>(
        &mut self,
        bus: &mut B,
        pins: &mut P,
        baudrate: u32,
        pull_ups: bool,
    ) {
        bus.configure(&I2cConfig::with_frequency(baudrate));
        pins.select_i2c_function();
        if pull_ups {
            pins.enable_pull_ups();
        }
        self.state = InterfaceState::Initialized;
        log_info!("i2c init: {} Hz, pull-ups {}", baudrate, pull_ups);
    }

    /// Disable the bus and release the pulls on both pins
    pub fn deinit<B: I2cBus, P: I2cPins>(&mut self, bus: &mut B, pins: &mut P) {
        bus.disable();
        pins.disable_pulls();
        self.state = InterfaceState::NotInitialized;
        log_info!("i2c deinit");
    }
}
