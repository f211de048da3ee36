//! Blocking I2C master on the RP2040 DesignWare I2C block
//!
//! Drives the controller registers directly so that every transfer can
//! choose its own stop and restart bits. The embassy I2C driver always
//! closes a transaction, which rules out streamed writes that span several
//! calls.
//!
//! Each byte is queued with its command bits in `IC_DATA_CMD`. The block
//! sends a START (or repeated START) before the first byte and a STOP after
//! a byte with the stop bit. When the TX FIFO runs empty without a stop the
//! controller holds SCL low, keeping the bus claimed until the next byte.

use embassy_rp::clocks::clk_peri_freq;
use embassy_rp::pac;
use embassy_rp::peripherals::{I2C0, I2C1};
use embassy_rp::Peri;
use embassy_time::{Duration, Instant};
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use pontis_hal::{I2cBus, I2cConfig, Stop};

/// Lowest SCL rate the counters can express at the default clock
pub const MIN_FREQUENCY: u32 = 2_000;

/// Highest SCL rate supported (fast mode plus)
pub const MAX_FREQUENCY: u32 = 1_000_000;

/// Default time allowed for one byte, including clock stretching
pub const DEFAULT_BYTE_TIMEOUT: Duration = Duration::from_millis(5);

/// Depth of the TX FIFO
const TX_FIFO_DEPTH: u8 = 16;

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Address not acknowledged
    AddressNack,
    /// Lost arbitration to another master
    ArbitrationLoss,
    /// A byte did not complete in time
    Timeout,
    /// Address outside the 7-bit range or reserved
    InvalidAddress(u8),
    /// Any other abort; raw `IC_TX_ABRT_SOURCE`
    Abort(u32),
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::AddressNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Error::ArbitrationLoss => ErrorKind::ArbitrationLoss,
            Error::Timeout | Error::InvalidAddress(_) | Error::Abort(_) => ErrorKind::Other,
        }
    }
}

/// Why the controller aborted a transfer
#[derive(Debug, Clone, Copy)]
enum Abort {
    AddressNack,
    DataNack,
    ArbitrationLoss,
    Other(u32),
}

/// One of the two I2C blocks
pub enum I2cBlock {
    I2c0(Peri<'static, I2C0>),
    I2c1(Peri<'static, I2C1>),
}

impl I2cBlock {
    /// Hardware index
    pub fn index(&self) -> u8 {
        match self {
            I2cBlock::I2c0(_) => 0,
            I2cBlock::I2c1(_) => 1,
        }
    }

    fn regs(&self) -> pac::i2c::I2c {
        match self {
            I2cBlock::I2c0(_) => pac::I2C0,
            I2cBlock::I2c1(_) => pac::I2C1,
        }
    }
}

/// SCL counter values for one bus rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// Rate actually programmed after clamping
    pub frequency: u32,
    pub hcnt: u16,
    pub lcnt: u16,
    pub spklen: u8,
    pub sda_hold: u16,
}

impl BusTiming {
    /// Counter values for `frequency` with the peripheral clock at `clk_hz`
    ///
    /// Low time is 60% of the period. SDA is held at least 300 ns after the
    /// falling edge of SCL (120 ns in fast mode plus).
    pub fn compute(clk_hz: u32, frequency: u32) -> Self {
        let frequency = frequency.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
        let period = (clk_hz + frequency / 2) / frequency;
        let lcnt = (period * 3 / 5).clamp(8, u16::MAX as u32);
        let hcnt = period.saturating_sub(lcnt).clamp(8, u16::MAX as u32);
        let spklen = if lcnt < 16 { 1 } else { (lcnt / 16).min(u8::MAX as u32) };

        let hold = if frequency < MAX_FREQUENCY {
            clk_hz * 3 / 10_000_000 + 1
        } else {
            clk_hz * 3 / 25_000_000 + 1
        };
        let sda_hold = hold.min(lcnt - 2);

        Self {
            frequency,
            hcnt: hcnt as u16,
            lcnt: lcnt as u16,
            spklen: spklen as u8,
            sda_hold: sda_hold as u16,
        }
    }
}

/// Reserved addresses: 0000xxx and 1111xxx
fn is_reserved(address: u8) -> bool {
    address > 0x7F || (address & 0x78) == 0 || (address & 0x78) == 0x78
}

/// Blocking I2C master
pub struct Rp2040I2c {
    block: I2cBlock,
    /// Address currently in `IC_TAR`
    target: Option<u8>,
    restart_on_next: bool,
    byte_timeout: Duration,
}

impl Rp2040I2c {
    /// Wrap an I2C block; it stays disabled until configured
    pub fn new(block: I2cBlock) -> Self {
        Self {
            block,
            target: None,
            restart_on_next: false,
            byte_timeout: DEFAULT_BYTE_TIMEOUT,
        }
    }

    /// Change the per-byte timeout
    pub fn with_byte_timeout(mut self, timeout: Duration) -> Self {
        self.byte_timeout = timeout;
        self
    }

    /// Hardware index
    pub fn index(&self) -> u8 {
        self.block.index()
    }

    /// Pulse the block's reset and wait for it to come back
    fn reset(&self) {
        let index = self.block.index();
        pac::RESETS.reset().modify(|w| match index {
            0 => w.set_i2c0(true),
            _ => w.set_i2c1(true),
        });
        pac::RESETS.reset().modify(|w| match index {
            0 => w.set_i2c0(false),
            _ => w.set_i2c1(false),
        });
        loop {
            let done = pac::RESETS.reset_done().read();
            let ready = match index {
                0 => done.i2c0(),
                _ => done.i2c1(),
            };
            if ready {
                break;
            }
        }
    }

    /// Point the controller at `address` and pick the start condition
    fn begin(&mut self, address: u8) -> Result<bool, Error> {
        if is_reserved(address) {
            return Err(Error::InvalidAddress(address));
        }

        if self.target != Some(address) {
            // IC_TAR can only be written while the block is disabled
            let regs = self.block.regs();
            regs.ic_enable().write(|w| w.set_enable(false));
            regs.ic_tar().write(|w| w.set_ic_tar(address as u16));
            regs.ic_enable().write(|w| w.set_enable(true));
            self.target = Some(address);
        }

        Ok(self.restart_on_next)
    }

    /// Read and clear the abort source, if any
    fn take_abort(&self) -> Option<Abort> {
        let regs = self.block.regs();
        let source = regs.ic_tx_abrt_source().read();
        if source.0 == 0 {
            return None;
        }
        // Reading the clear register also clears the source
        let _ = regs.ic_clr_tx_abrt().read();

        let abort = if source.abrt_7b_addr_noack()
            || source.abrt_10addr1_noack()
            || source.abrt_10addr2_noack()
        {
            Abort::AddressNack
        } else if source.abrt_txdata_noack() {
            Abort::DataNack
        } else if source.arb_lost() {
            Abort::ArbitrationLoss
        } else {
            Abort::Other(source.0)
        };
        Some(abort)
    }

    /// Wait for the STOP after an abort or a final byte
    fn wait_stop(&self) -> Result<(), Error> {
        let regs = self.block.regs();
        let deadline = Instant::now() + self.byte_timeout;
        while !regs.ic_raw_intr_stat().read().stop_det() {
            if Instant::now() > deadline {
                return Err(Error::Timeout);
            }
            cortex_m::asm::nop();
        }
        let _ = regs.ic_clr_stop_det().read();
        Ok(())
    }

    /// Map an abort onto a result; a data NACK is a short transfer
    fn aborted(&mut self, abort: Abort, transferred: usize) -> Result<usize, Error> {
        // The controller releases the bus after any abort
        let _ = self.wait_stop();
        self.restart_on_next = false;
        match abort {
            Abort::AddressNack => Err(Error::AddressNack),
            Abort::DataNack => Ok(transferred),
            Abort::ArbitrationLoss => Err(Error::ArbitrationLoss),
            Abort::Other(source) => Err(Error::Abort(source)),
        }
    }
}

impl I2cBus for Rp2040I2c {
    type Error = Error;

    fn configure(&mut self, config: &I2cConfig) {
        self.reset();

        let regs = self.block.regs();
        regs.ic_enable().write(|w| w.set_enable(false));
        regs.ic_con().write(|w| {
            w.set_speed(pac::i2c::vals::Speed::FAST);
            w.set_master_mode(true);
            w.set_ic_slave_disable(true);
            w.set_ic_restart_en(true);
            w.set_tx_empty_ctrl(true);
        });
        regs.ic_tx_tl().write(|w| w.set_tx_tl(0));
        regs.ic_rx_tl().write(|w| w.set_rx_tl(0));

        let timing = BusTiming::compute(clk_peri_freq(), config.frequency);
        #[cfg(feature = "defmt")]
        if timing.frequency != config.frequency {
            defmt::warn!(
                "i2c{}: {} Hz out of range, using {} Hz",
                self.block.index(),
                config.frequency,
                timing.frequency
            );
        }

        regs.ic_fs_scl_hcnt().write(|w| w.set_ic_fs_scl_hcnt(timing.hcnt));
        regs.ic_fs_scl_lcnt().write(|w| w.set_ic_fs_scl_lcnt(timing.lcnt));
        regs.ic_fs_spklen().write(|w| w.set_ic_fs_spklen(timing.spklen));
        regs.ic_sda_hold()
            .modify(|w| w.set_ic_sda_tx_hold(timing.sda_hold));

        regs.ic_enable().write(|w| w.set_enable(true));
        self.target = None;
        self.restart_on_next = false;
    }

    fn disable(&mut self) {
        self.block.regs().ic_enable().write(|w| w.set_enable(false));
        self.target = None;
        self.restart_on_next = false;
    }

    fn write(&mut self, address: u8, data: &[u8], stop: Stop) -> Result<usize, Self::Error> {
        if data.is_empty() {
            return Ok(0);
        }
        let restart = self.begin(address)?;
        let regs = self.block.regs();
        let last_index = data.len() - 1;

        for (i, byte) in data.iter().enumerate() {
            let last = i == last_index;
            regs.ic_data_cmd().write(|w| {
                w.set_restart(restart && i == 0);
                w.set_stop(stop.is_sent() && last);
                w.set_dat(*byte);
            });

            // Wait until the byte has left the shift register
            let deadline = Instant::now() + self.byte_timeout;
            while !regs.ic_raw_intr_stat().read().tx_empty() {
                if Instant::now() > deadline {
                    return Err(Error::Timeout);
                }
                cortex_m::asm::nop();
            }

            if let Some(abort) = self.take_abort() {
                return self.aborted(abort, i);
            }
        }

        if stop.is_sent() {
            self.wait_stop()?;
        }
        self.restart_on_next = !stop.is_sent();
        Ok(data.len())
    }

    fn read(&mut self, address: u8, buf: &mut [u8], stop: Stop) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        let restart = self.begin(address)?;
        let regs = self.block.regs();
        let last_index = buf.len() - 1;

        for i in 0..buf.len() {
            let deadline = Instant::now() + self.byte_timeout;
            while regs.ic_txflr().read().txflr() >= TX_FIFO_DEPTH {
                if Instant::now() > deadline {
                    return Err(Error::Timeout);
                }
            }

            regs.ic_data_cmd().write(|w| {
                w.set_restart(restart && i == 0);
                w.set_stop(stop.is_sent() && i == last_index);
                w.set_cmd(true);
            });

            while regs.ic_rxflr().read().rxflr() == 0 {
                if let Some(abort) = self.take_abort() {
                    return self.aborted(abort, i);
                }
                if Instant::now() > deadline {
                    return Err(Error::Timeout);
                }
            }
            buf[i] = regs.ic_data_cmd().read().dat();
        }

        if stop.is_sent() {
            self.wait_stop()?;
        }
        self.restart_on_next = !stop.is_sent();
        Ok(buf.len())
    }

    fn set_restart_on_next(&mut self, restart: bool) {
        self.restart_on_next = restart;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLK: u32 = 125_000_000;

    #[test]
    fn test_timing_standard_mode() {
        let t = BusTiming::compute(CLK, 100_000);
        assert_eq!(t.frequency, 100_000);
        assert_eq!(t.lcnt, 750);
        assert_eq!(t.hcnt, 500);
        assert_eq!(t.spklen, 46);
        assert_eq!(t.sda_hold, 38);
    }

    #[test]
    fn test_timing_fast_mode_plus_hold() {
        let t = BusTiming::compute(CLK, 1_000_000);
        assert_eq!(t.lcnt, 75);
        assert_eq!(t.hcnt, 50);
        assert_eq!(t.sda_hold, 16);
    }

    #[test]
    fn test_timing_clamps_rate() {
        assert_eq!(BusTiming::compute(CLK, 0).frequency, MIN_FREQUENCY);
        assert_eq!(BusTiming::compute(CLK, 5_000_000).frequency, MAX_FREQUENCY);
    }

    #[test]
    fn test_reserved_addresses() {
        assert!(is_reserved(0x00));
        assert!(is_reserved(0x07));
        assert!(is_reserved(0x78));
        assert!(is_reserved(0x80));
        assert!(!is_reserved(0x08));
        assert!(!is_reserved(0x50));
        assert!(!is_reserved(0x77));
    }
}
