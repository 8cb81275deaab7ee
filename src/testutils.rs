//! Register-level MFRC522 model with an optional MIFARE Classic 1K card in
//! the field. Every exchange completes synchronously inside the SPI write
//! that starts it, so a single poll observes completion.

use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::card_types::{Block, Key};
use crate::registers::*;
use crate::transport::Transport;

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// DelayNs that only counts requested microseconds.
#[derive(Default)]
pub struct CountingDelay {
    pub total_us: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_us += u64::from(ns / 1_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.total_us += u64::from(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_us += u64::from(ms) * 1_000;
    }
}

/// ISO/IEC 14443-A CRC, preset 0x6363, low byte first.
pub fn crc_a(data: &[u8]) -> [u8; 2] {
    let mut crc: u16 = 0x6363;
    for &b in data {
        let mut ch = b ^ (crc as u8);
        ch ^= ch << 4;
        let ch = u16::from(ch);
        crc = (crc >> 8) ^ (ch << 8) ^ (ch << 3) ^ (ch >> 4);
    }
    [crc as u8, (crc >> 8) as u8]
}

fn crc_ok(frame: &[u8]) -> bool {
    frame.len() > 2 && crc_a(&frame[..frame.len() - 2]) == frame[frame.len() - 2..]
}

fn with_crc(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    out.extend_from_slice(&crc_a(data));
    out
}

/// What the field returns for one Transceive.
#[derive(Debug, Clone)]
pub struct Reply {
    pub bytes: Vec<u8>,
    /// Valid bits in the last byte, 0 for a whole byte.
    pub last_bits: u8,
    /// Value latched into the Error register.
    pub error: u8,
}

impl Reply {
    pub fn bytes(bytes: &[u8]) -> Self {
        Reply { bytes: bytes.to_vec(), last_bits: 0, error: 0 }
    }

    pub fn bits(bytes: &[u8], last_bits: u8) -> Self {
        Reply { bytes: bytes.to_vec(), last_bits, error: 0 }
    }

    pub fn fault(error: u8) -> Self {
        Reply { bytes: Vec::new(), last_bits: 0, error }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Idle,
    Ready,
    Active,
    Authenticated(u8),
    AwaitWriteData(u8),
    Halted,
}

pub struct SimCard {
    pub serial: [u8; 4],
    pub sak: u8,
    pub key_a: Key,
    pub blocks: [Block; 64],
    /// Answer every WRITE with a NAK.
    pub refuse_writes: bool,
    pub state: CardState,
}

impl SimCard {
    pub fn classic_1k(serial: [u8; 4]) -> Self {
        SimCard {
            serial,
            sak: 0x08,
            key_a: [0xFF; 6],
            blocks: [[0; 16]; 64],
            refuse_writes: false,
            state: CardState::Idle,
        }
    }

    fn uid(&self) -> [u8; 5] {
        let s = self.serial;
        [s[0], s[1], s[2], s[3], s[0] ^ s[1] ^ s[2] ^ s[3]]
    }

    fn sector_of(block: u8) -> u8 {
        block / 4
    }

    fn respond(&mut self, frame: &[u8], tx_last_bits: u8) -> Option<Reply> {
        if tx_last_bits == 7 && frame.len() == 1 {
            return match (frame[0], self.state) {
                (0x52, _) | (0x26, CardState::Idle) | (0x26, CardState::Ready) => {
                    self.state = CardState::Ready;
                    Some(Reply::bytes(&[0x04, 0x00]))
                }
                _ => None,
            };
        }
        match frame {
            [0x93, 0x20] if self.state == CardState::Ready => Some(Reply::bytes(&self.uid())),
            [0x93, 0x70, uid @ .., _, _] if crc_ok(frame) && self.state == CardState::Ready => {
                if uid == self.uid() {
                    self.state = CardState::Active;
                    Some(Reply::bytes(&with_crc(&[self.sak])))
                } else {
                    None
                }
            }
            [0x50, 0x00, _, _] if crc_ok(frame) => {
                self.state = CardState::Halted;
                None
            }
            [0x30, addr, _, _] if crc_ok(frame) => match self.state {
                CardState::Authenticated(sector) if Self::sector_of(*addr) == sector => {
                    Some(Reply::bytes(&with_crc(&self.blocks[*addr as usize])))
                }
                _ => None,
            },
            [0xA0, addr, _, _] if crc_ok(frame) => match self.state {
                CardState::Authenticated(sector) if Self::sector_of(*addr) == sector => {
                    if self.refuse_writes {
                        Some(Reply::bits(&[0x04], 4))
                    } else {
                        self.state = CardState::AwaitWriteData(*addr);
                        Some(Reply::bits(&[0x0A], 4))
                    }
                }
                _ => None,
            },
            data if data.len() == 18 && crc_ok(data) => match self.state {
                CardState::AwaitWriteData(addr) => {
                    self.blocks[addr as usize].copy_from_slice(&data[..16]);
                    self.state = CardState::Authenticated(Self::sector_of(addr));
                    Some(Reply::bits(&[0x0A], 4))
                }
                _ => Some(Reply::bits(&[0x04], 4)),
            },
            _ => None,
        }
    }

    fn authenticate(&mut self, frame: &[u8]) -> bool {
        let active = matches!(self.state, CardState::Active | CardState::Authenticated(_));
        if !active || frame.len() != 12 || frame[0] != 0x60 || frame[1] >= 64 {
            return false;
        }
        if frame[2..8] != self.key_a || frame[8..12] != self.serial {
            self.state = CardState::Idle;
            return false;
        }
        self.state = CardState::Authenticated(Self::sector_of(frame[1]));
        true
    }
}

pub struct SimChip {
    regs: [u8; 64],
    fifo: VecDeque<u8>,
    reads: [usize; 64],
    pub card: Option<SimCard>,
    /// Transceive replies consumed before the card model is asked.
    pub scripted: VecDeque<Reply>,
    /// Every frame that left the antenna, in order.
    pub frames: Vec<Vec<u8>>,
    pub reset_line: Vec<bool>,
    /// Commands start but never raise an interrupt.
    pub mute: bool,
    /// CRC unit holds these result bytes and never signals completion.
    pub stalled_crc: Option<[u8; 2]>,
}

impl SimChip {
    pub fn new() -> Self {
        let mut chip = SimChip {
            regs: [0; 64],
            fifo: VecDeque::new(),
            reads: [0; 64],
            card: None,
            scripted: VecDeque::new(),
            frames: Vec::new(),
            reset_line: Vec::new(),
            mute: false,
            stalled_crc: None,
        };
        chip.power_on();
        chip
    }

    pub fn with_card(card: SimCard) -> Self {
        let mut chip = Self::new();
        chip.card = Some(card);
        chip
    }

    fn power_on(&mut self) {
        self.regs = [0; 64];
        self.regs[Register::Command.addr() as usize] = 0x20;
        self.regs[Register::ComIEn.addr() as usize] = 0x80;
        self.regs[Register::TxControl.addr() as usize] = 0x80;
        self.regs[Register::RfCfg.addr() as usize] = 0x48;
        self.regs[Register::Version.addr() as usize] = 0x92;
        self.fifo.clear();
    }

    pub fn reg(&self, reg: Register) -> u8 {
        self.regs[reg.addr() as usize]
    }

    pub fn set_reg(&mut self, reg: Register, value: u8) {
        self.regs[reg.addr() as usize] = value;
    }

    /// SPI reads of `reg` since construction.
    pub fn reads(&self, reg: Register) -> usize {
        self.reads[reg.addr() as usize]
    }

    pub fn fifo_len(&self) -> usize {
        self.fifo.len()
    }

    fn read(&mut self, addr: u8) -> u8 {
        self.reads[addr as usize] += 1;
        match addr {
            a if a == Register::FifoData.addr() => self.fifo.pop_front().unwrap_or(0),
            a if a == Register::FifoLevel.addr() => self.fifo.len() as u8,
            a => self.regs[a as usize],
        }
    }

    fn write(&mut self, addr: u8, value: u8) {
        let i = addr as usize;
        match addr {
            a if a == Register::FifoData.addr() => {
                if self.fifo.len() < 64 {
                    self.fifo.push_back(value);
                } else {
                    self.regs[Register::Error.addr() as usize] |= ERROR_BUFFER_OVERFLOW;
                }
            }
            a if a == Register::FifoLevel.addr() => {
                if value & FIFO_FLUSH != 0 {
                    self.fifo.clear();
                }
            }
            a if a == Register::ComIrq.addr() || a == Register::DivIrq.addr() => {
                if value & IRQ_SET1 != 0 {
                    self.regs[i] |= value & 0x7F;
                } else {
                    self.regs[i] &= !value;
                }
            }
            a if a == Register::Command.addr() => {
                self.regs[i] = value;
                self.execute(value & 0x0F);
            }
            a if a == Register::BitFraming.addr() => {
                self.regs[i] = value;
                let transceiving = self.reg(Register::Command) & 0x0F == 0x0C;
                if value & BIT_FRAMING_START_SEND != 0 && transceiving {
                    self.transceive();
                }
            }
            _ => self.regs[i] = value,
        }
    }

    fn execute(&mut self, command: u8) {
        match command {
            // CalcCRC
            0x03 => {
                let data: Vec<u8> = self.fifo.drain(..).collect();
                let (result, done) = match self.stalled_crc {
                    Some(bytes) => (bytes, false),
                    None => (crc_a(&data), true),
                };
                self.set_reg(Register::CrcResultLow, result[0]);
                self.set_reg(Register::CrcResultHigh, result[1]);
                if done {
                    self.regs[Register::DivIrq.addr() as usize] |= DIV_IRQ_CRC;
                }
            }
            // MFAuthent
            0x0E => {
                let frame: Vec<u8> = self.fifo.drain(..).collect();
                self.set_reg(Register::Error, 0);
                if self.mute {
                    return;
                }
                let ok = self.card.as_mut().map_or(false, |card| card.authenticate(&frame));
                let irq = Register::ComIrq.addr() as usize;
                if ok {
                    self.regs[Register::Status2.addr() as usize] |= STATUS2_CRYPTO1_ON;
                    self.regs[irq] |= IRQ_IDLE;
                } else {
                    // The card stays silent, the chip timer runs out.
                    self.regs[irq] |= IRQ_TIMER;
                }
            }
            // SoftReset
            0x0F => self.power_on(),
            _ => {}
        }
    }

    fn transceive(&mut self) {
        let frame: Vec<u8> = self.fifo.drain(..).collect();
        let tx_last_bits = self.reg(Register::BitFraming) & 0x07;
        self.frames.push(frame.clone());
        self.set_reg(Register::Error, 0);
        if self.mute {
            return;
        }

        let reply = match self.scripted.pop_front() {
            Some(reply) => Some(reply),
            None => self.card.as_mut().and_then(|card| card.respond(&frame, tx_last_bits)),
        };

        let irq = Register::ComIrq.addr() as usize;
        let control = Register::Control.addr() as usize;
        match reply {
            Some(reply) => {
                self.fifo.extend(reply.bytes.iter().copied());
                self.regs[control] = (self.regs[control] & !CONTROL_RX_LAST_BITS) | reply.last_bits;
                self.set_reg(Register::Error, reply.error);
                self.regs[irq] |= if reply.error != 0 { IRQ_ERR | IRQ_IDLE } else { IRQ_RX | IRQ_IDLE };
            }
            None => {
                self.regs[control] &= !CONTROL_RX_LAST_BITS;
                self.regs[irq] |= IRQ_TIMER;
            }
        }
    }
}

impl Transport for SimChip {
    type Error = Infallible;

    fn transfer(&mut self, frame: &mut [u8]) -> Result<(), Infallible> {
        assert_eq!(frame.len(), 2, "register access is always two bytes");
        assert_eq!(frame[0] & 0x01, 0, "bit 0 of the address byte is reserved");
        let addr = (frame[0] >> 1) & 0x3F;
        if frame[0] & 0x80 != 0 {
            frame[1] = self.read(addr);
        } else {
            self.write(addr, frame[1]);
        }
        Ok(())
    }

    fn set_reset(&mut self, high: bool) -> Result<(), Infallible> {
        self.reset_line.push(high);
        if !high {
            self.power_on();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_a_reference_values() {
        // ISO 14443-3 annex B, plus the well-known HLTA frame.
        assert_eq!(crc_a(&[0x00, 0x00]), [0xA0, 0x1E]);
        assert_eq!(crc_a(&[0x12, 0x34]), [0x26, 0xCF]);
        assert_eq!(crc_a(&[0x50, 0x00]), [0x57, 0xCD]);
    }
}
