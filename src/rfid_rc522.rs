use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::{debug, info};
use ufmt::{uDebug, uWrite};

use crate::commands::Command;
use crate::config::{Config, RxGain};
use crate::errors::Status;
use crate::registers::*;
use crate::transport::Transport;

/// Most bytes a single exchange drains from the FIFO.
pub const FIFO_READ_MAX: usize = 16;

/// Result of one [`RfidRc522::to_card`] exchange.
///
/// `data` is only meaningful when `status` is [`Status::Ok`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transceived {
    pub status: Status,
    pub data: Vec<u8, FIFO_READ_MAX>,
    /// Received length in bits, as reported by FIFOLevel and RxLastBits.
    pub bits: usize,
}

impl Transceived {
    fn failed() -> Self {
        Transceived {
            status: Status::Error,
            data: Vec::new(),
            bits: 0,
        }
    }
}

/// Chip identity, from the Version register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipVersion {
    V1_0,
    V2_0,
    /// FM17522 and other compatible clones
    Clone,
    /// All-zero or all-one reads: nothing answers on the bus.
    NoResponse,
    Unknown(u8),
}

impl ChipVersion {
    pub fn from_register(value: u8) -> Self {
        match value {
            0x91 => ChipVersion::V1_0,
            0x92 => ChipVersion::V2_0,
            0x88 => ChipVersion::Clone,
            0x00 | 0xFF => ChipVersion::NoResponse,
            other => ChipVersion::Unknown(other),
        }
    }

    pub fn is_responding(self) -> bool {
        self != ChipVersion::NoResponse
    }
}

impl uDebug for ChipVersion {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            ChipVersion::V1_0 => f.write_str("V1_0"),
            ChipVersion::V2_0 => f.write_str("V2_0"),
            ChipVersion::Clone => f.write_str("Clone"),
            ChipVersion::NoResponse => f.write_str("NoResponse"),
            ChipVersion::Unknown(v) => {
                f.write_str("Unknown(")?;
                uDebug::fmt(v, f)?;
                f.write_str(")")
            }
        }
    }
}

/// MFRC522 driver. Owns its transport; every exchange takes `&mut self`, so
/// no two exchanges can interleave on the FIFO and interrupt registers.
pub struct RfidRc522<T, D> {
    transport: T,
    delay: D,
    config: Config,
}

impl<T, D> RfidRc522<T, D>
where
    T: Transport,
    D: DelayNs,
{
    pub fn new(transport: T, delay: D) -> Self {
        Self::with_config(transport, delay, Config::default())
    }

    pub fn with_config(transport: T, delay: D, config: Config) -> Self {
        RfidRc522 {
            transport,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gives back the transport and delay.
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }

    /// Pulses the reset line high, low, high. Must precede first use.
    pub fn hard_reset(&mut self) -> Result<(), T::Error> {
        self.transport.set_reset(true)?;
        self.delay.delay_ms(10);
        self.transport.set_reset(false)?;
        self.delay.delay_ms(10);
        self.transport.set_reset(true)?;
        self.delay.delay_ms(50);
        Ok(())
    }

    pub fn soft_reset(&mut self) -> Result<(), T::Error> {
        self.write_register(Register::Command, Command::SoftReset.code())?;
        self.delay.delay_ms(50);
        Ok(())
    }

    /// Soft reset followed by timer, modulation and CRC preset setup, then
    /// switches the antenna on.
    pub fn init(&mut self) -> Result<(), T::Error> {
        self.soft_reset()?;

        // TAuto, prescaler 0xD3E: ~25 ms with a reload of 30.
        self.write_register(Register::TMode, 0x8D)?;
        self.write_register(Register::TPrescaler, 0x3E)?;
        self.write_register(Register::TReloadLow, 30)?;
        self.write_register(Register::TReloadHigh, 0)?;

        self.write_register(Register::TxAsk, 0x40)?; // 100% ASK
        self.write_register(Register::Mode, 0x3D)?; // CRC preset to 0x6363

        if let Some(gain) = self.config.antenna_gain {
            self.set_antenna_gain(gain)?;
        }
        self.antenna_on()?;

        let version = self.version()?;
        info!(
            "MFRC522 ready, version 0x{:02X} ({:?})",
            version,
            ChipVersion::from_register(version)
        );
        Ok(())
    }

    pub fn version(&mut self) -> Result<u8, T::Error> {
        self.read_register(Register::Version)
    }

    pub fn chip_version(&mut self) -> Result<ChipVersion, T::Error> {
        self.version().map(ChipVersion::from_register)
    }

    pub fn antenna_on(&mut self) -> Result<(), T::Error> {
        let current = self.read_register(Register::TxControl)?;
        if current & TX_CONTROL_ANTENNA != TX_CONTROL_ANTENNA {
            self.set_bits(Register::TxControl, TX_CONTROL_ANTENNA)?;
        }
        Ok(())
    }

    pub fn antenna_off(&mut self) -> Result<(), T::Error> {
        self.clear_bits(Register::TxControl, TX_CONTROL_ANTENNA)
    }

    pub fn set_antenna_gain(&mut self, gain: RxGain) -> Result<(), T::Error> {
        let current = self.read_register(Register::RfCfg)?;
        self.write_register(Register::RfCfg, (current & !RF_CFG_GAIN_MASK) | gain.bits())
    }

    pub fn write_register(&mut self, reg: Register, value: u8) -> Result<(), T::Error> {
        let mut frame = [reg.write_address(), value];
        self.transport.transfer(&mut frame)
    }

    pub fn read_register(&mut self, reg: Register) -> Result<u8, T::Error> {
        let mut frame = [reg.read_address(), 0x00];
        self.transport.transfer(&mut frame)?;
        Ok(frame[1])
    }

    /// Read-modify-write; not atomic with respect to the chip.
    pub fn set_bits(&mut self, reg: Register, mask: u8) -> Result<(), T::Error> {
        let current = self.read_register(reg)?;
        self.write_register(reg, current | mask)
    }

    /// Read-modify-write; not atomic with respect to the chip.
    pub fn clear_bits(&mut self, reg: Register, mask: u8) -> Result<(), T::Error> {
        let current = self.read_register(reg)?;
        self.write_register(reg, current & !mask)
    }

    fn flush_fifo(&mut self) -> Result<(), T::Error> {
        self.set_bits(Register::FifoLevel, FIFO_FLUSH)
    }

    fn write_fifo(&mut self, data: &[u8]) -> Result<(), T::Error> {
        for &byte in data {
            self.write_register(Register::FifoData, byte)?;
        }
        Ok(())
    }

    fn pause(&mut self) {
        if self.config.poll_interval_us != 0 {
            self.delay.delay_us(self.config.poll_interval_us);
        }
    }

    /// Runs the CRC coprocessor over `data` and returns `[low, high]`.
    ///
    /// The result registers are read even if the poll budget runs out; a
    /// stale CRC then surfaces as an `Error` from the card exchange.
    pub fn calculate_crc(&mut self, data: &[u8]) -> Result<[u8; 2], T::Error> {
        // Set1 clear: writing the bit clears it.
        self.write_register(Register::DivIrq, DIV_IRQ_CRC)?;
        self.flush_fifo()?;
        self.write_fifo(data)?;
        self.write_register(Register::Command, Command::CalcCrc.code())?;

        let mut done = false;
        for _ in 0..self.config.crc_poll_budget {
            if self.read_register(Register::DivIrq)? & DIV_IRQ_CRC != 0 {
                done = true;
                break;
            }
            self.pause();
        }
        if !done {
            debug!("CRC poll budget of {} exhausted", self.config.crc_poll_budget);
        }

        let low = self.read_register(Register::CrcResultLow)?;
        let high = self.read_register(Register::CrcResultHigh)?;
        Ok([low, high])
    }

    /// Loads `send` into the FIFO, runs `command` and waits for it with a
    /// bounded poll. For `Transceive` the answer is drained from the FIFO.
    pub fn to_card(&mut self, command: Command, send: &[u8]) -> Result<Transceived, T::Error> {
        let irq = command.irq_profile();

        self.write_register(Register::ComIEn, irq.enable | IRQ_SET1)?;
        self.clear_bits(Register::ComIrq, IRQ_SET1)?;
        self.flush_fifo()?;
        self.write_register(Register::Command, Command::Idle.code())?;
        self.write_fifo(send)?;
        self.write_register(Register::Command, command.code())?;

        if command == Command::Transceive {
            self.set_bits(Register::BitFraming, BIT_FRAMING_START_SEND)?;
        }

        let mut pending = 0;
        let mut completed = false;
        for _ in 0..self.config.transceive_poll_budget {
            pending = self.read_register(Register::ComIrq)?;
            if pending & (IRQ_TIMER | irq.wait) != 0 {
                completed = true;
                break;
            }
            self.pause();
        }

        self.clear_bits(Register::BitFraming, BIT_FRAMING_START_SEND)?;

        if !completed {
            debug!(
                "{:?} poll budget of {} exhausted",
                command, self.config.transceive_poll_budget
            );
            return Ok(Transceived::failed());
        }

        let error = self.read_register(Register::Error)?;
        if error & ERROR_MASK != 0 {
            debug!("{:?} failed, error register 0x{:02X}", command, error);
            return Ok(Transceived::failed());
        }

        let mut back = Transceived {
            status: if pending & irq.enable & IRQ_TIMER != 0 {
                Status::NoTag
            } else {
                Status::Ok
            },
            data: Vec::new(),
            bits: 0,
        };

        if command == Command::Transceive {
            let level = usize::from(self.read_register(Register::FifoLevel)? & 0x7F);
            let last_bits = usize::from(self.read_register(Register::Control)? & CONTROL_RX_LAST_BITS);
            back.bits = if last_bits != 0 {
                level.saturating_sub(1) * 8 + last_bits
            } else {
                level * 8
            };

            for _ in 0..level.clamp(1, FIFO_READ_MAX) {
                let byte = self.read_register(Register::FifoData)?;
                back.data.push(byte).ok();
            }
        }

        Ok(back)
    }
}
