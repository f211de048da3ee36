//! Config-driven pin and I2C block allocation
//!
//! Channel pin numbers come from [`ChannelConfig`], so pins are handed out
//! by number at runtime rather than by typed peripheral field.

use embassy_rp::gpio::AnyPin;
use embassy_rp::peripherals::{I2C0, I2C1};
use embassy_rp::{pac, Peri, Peripherals};
use pontis_core::ChannelConfig;
use pontis_hal::I2cPins;

use crate::i2c::I2cBlock;

/// Number of user GPIOs in bank 0
pub const PIN_COUNT: usize = 30;

/// `FUNCSEL` value routing a pin to its I2C block
const FUNCSEL_I2C: u8 = 3;

/// Error when allocating pins or blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin or block already taken
    AlreadyTaken,
    /// Pin cannot carry this signal of this I2C block
    WrongFunction(u8),
    /// No such I2C block
    InvalidBlock(u8),
}

/// GPIO pins that can be taken by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; PIN_COUNT],
}

/// The two I2C blocks, each taken at most once
pub struct I2cBlocks {
    i2c0: Option<Peri<'static, I2C0>>,
    i2c1: Option<Peri<'static, I2C1>>,
}

/// Split the peripherals into a pin bank and the I2C blocks
pub fn split(p: Peripherals) -> (PinBank, I2cBlocks) {
    let pins: [Peri<'static, AnyPin>; PIN_COUNT] = [
        p.PIN_0.into(),
        p.PIN_1.into(),
        p.PIN_2.into(),
        p.PIN_3.into(),
        p.PIN_4.into(),
        p.PIN_5.into(),
        p.PIN_6.into(),
        p.PIN_7.into(),
        p.PIN_8.into(),
        p.PIN_9.into(),
        p.PIN_10.into(),
        p.PIN_11.into(),
        p.PIN_12.into(),
        p.PIN_13.into(),
        p.PIN_14.into(),
        p.PIN_15.into(),
        p.PIN_16.into(),
        p.PIN_17.into(),
        p.PIN_18.into(),
        p.PIN_19.into(),
        p.PIN_20.into(),
        p.PIN_21.into(),
        p.PIN_22.into(),
        p.PIN_23.into(),
        p.PIN_24.into(),
        p.PIN_25.into(),
        p.PIN_26.into(),
        p.PIN_27.into(),
        p.PIN_28.into(),
        p.PIN_29.into(),
    ];
    let bank = PinBank {
        pins: pins.map(Some),
    };
    let blocks = I2cBlocks {
        i2c0: Some(p.I2C0),
        i2c1: Some(p.I2C1),
    };
    (bank, blocks)
}

/// Whether `pin` can carry SDA (`scl == false`) or SCL of I2C block `index`
///
/// The bank repeats SDA0, SCL0, SDA1, SCL1 every four pins.
pub fn supports_i2c(pin: u8, index: u8, scl: bool) -> bool {
    index < 2 && (pin as usize) < PIN_COUNT && pin % 4 == index * 2 + scl as u8
}

impl PinBank {
    /// Take a pin by number
    pub fn take(&mut self, pin: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(pin as usize)
            .ok_or(PinError::InvalidPin(pin))?
            .take()
            .ok_or(PinError::AlreadyTaken)
    }

    /// Check if a pin is available
    pub fn is_available(&self, pin: u8) -> bool {
        matches!(self.pins.get(pin as usize), Some(Some(_)))
    }

    /// Take the SDA/SCL pair of a channel
    ///
    /// Both pins are checked before either is taken.
    pub fn take_i2c_pins(&mut self, channel: &ChannelConfig) -> Result<Rp2040I2cPins, PinError> {
        for (pin, scl) in [(channel.sda_pin, false), (channel.scl_pin, true)] {
            if (pin as usize) >= PIN_COUNT {
                return Err(PinError::InvalidPin(pin));
            }
            if !supports_i2c(pin, channel.index, scl) {
                return Err(PinError::WrongFunction(pin));
            }
            if !self.is_available(pin) {
                return Err(PinError::AlreadyTaken);
            }
        }

        Ok(Rp2040I2cPins {
            sda_pin: channel.sda_pin,
            scl_pin: channel.scl_pin,
            _sda: self.take(channel.sda_pin)?,
            _scl: self.take(channel.scl_pin)?,
        })
    }
}

impl I2cBlocks {
    /// Take an I2C block by index
    pub fn take(&mut self, index: u8) -> Result<I2cBlock, PinError> {
        match index {
            0 => self
                .i2c0
                .take()
                .map(I2cBlock::I2c0)
                .ok_or(PinError::AlreadyTaken),
            1 => self
                .i2c1
                .take()
                .map(I2cBlock::I2c1)
                .ok_or(PinError::AlreadyTaken),
            _ => Err(PinError::InvalidBlock(index)),
        }
    }
}

/// SDA/SCL pair owned by one I2C channel
pub struct Rp2040I2cPins {
    sda_pin: u8,
    scl_pin: u8,
    _sda: Peri<'static, AnyPin>,
    _scl: Peri<'static, AnyPin>,
}

impl Rp2040I2cPins {
    fn each(&self, f: impl Fn(usize)) {
        f(self.sda_pin as usize);
        f(self.scl_pin as usize);
    }
}

impl I2cPins for Rp2040I2cPins {
    fn select_i2c_function(&mut self) {
        self.each(|n| {
            pac::PADS_BANK0.gpio(n).modify(|w| {
                w.set_schmitt(true);
                w.set_slewfast(false);
                w.set_ie(true);
                w.set_od(false);
            });
            pac::IO_BANK0
                .gpio(n)
                .ctrl()
                .write(|w| w.set_funcsel(FUNCSEL_I2C));
        });
    }

    fn enable_pull_ups(&mut self) {
        self.each(|n| {
            pac::PADS_BANK0.gpio(n).modify(|w| {
                w.set_pue(true);
                w.set_pde(false);
            });
        });
    }

    fn disable_pulls(&mut self) {
        self.each(|n| {
            pac::PADS_BANK0.gpio(n).modify(|w| {
                w.set_pue(false);
                w.set_pde(false);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pico_default_pins_supported() {
        let i2c0 = ChannelConfig::I2C0;
        let i2c1 = ChannelConfig::I2C1;
        assert!(supports_i2c(i2c0.sda_pin, 0, false));
        assert!(supports_i2c(i2c0.scl_pin, 0, true));
        assert!(supports_i2c(i2c1.sda_pin, 1, false));
        assert!(supports_i2c(i2c1.scl_pin, 1, true));
    }

    #[test]
    fn test_wrong_block_or_signal_rejected() {
        // GP4 is SDA0, not SCL0 and not on I2C1
        assert!(!supports_i2c(4, 0, true));
        assert!(!supports_i2c(4, 1, false));
        assert!(!supports_i2c(30, 0, false));
    }
}
