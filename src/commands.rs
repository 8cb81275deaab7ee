// src/commands.rs

use crate::registers::{IRQ_ERR, IRQ_IDLE, IRQ_LO_ALERT, IRQ_RX, IRQ_TIMER, IRQ_TX};

/// Commands for the MFRC522 (written to the Command register)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Idle = 0x00,
    CalcCrc = 0x03,
    Transmit = 0x04,
    Receive = 0x08,
    Transceive = 0x0C,
    Authent = 0x0E,
    SoftReset = 0x0F,
}

/// Interrupt bits a command enables and the ones that mark it complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqProfile {
    /// Written to ComIEn (with IRqInv set).
    pub enable: u8,
    /// Any of these in ComIrq ends the poll.
    pub wait: u8,
}

impl Command {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn irq_profile(self) -> IrqProfile {
        match self {
            Command::Authent => IrqProfile {
                enable: IRQ_IDLE | IRQ_ERR,
                wait: IRQ_IDLE,
            },
            Command::Transceive => IrqProfile {
                enable: IRQ_TX | IRQ_RX | IRQ_IDLE | IRQ_LO_ALERT | IRQ_ERR | IRQ_TIMER,
                wait: IRQ_RX | IRQ_IDLE,
            },
            _ => IrqProfile { enable: 0x00, wait: 0x00 },
        }
    }
}

// Card (PICC) commands
pub const PICC_REQIDL: u8 = 0x26;
pub const PICC_REQALL: u8 = 0x52;
pub const PICC_ANTICOLL: u8 = 0x93;
pub const PICC_SELECTTAG: u8 = 0x93;
pub const PICC_AUTHENT1A: u8 = 0x60;
pub const PICC_AUTHENT1B: u8 = 0x61;
pub const PICC_READ: u8 = 0x30;
pub const PICC_WRITE: u8 = 0xA0;
pub const PICC_HALT: u8 = 0x50;

// NVB values: 2 bytes sent (anticollision), 7 bytes sent (full select)
pub const NVB_ANTICOLL: u8 = 0x20;
pub const NVB_SELECT: u8 = 0x70;

/// 4-bit MIFARE ACK
pub const MIFARE_ACK: u8 = 0x0A;

/// Which REQUEST a card should answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// REQA: only cards in IDLE answer.
    Idle,
    /// WUPA: cards in IDLE or HALT answer.
    All,
}

impl RequestMode {
    pub const fn code(self) -> u8 {
        match self {
            RequestMode::Idle => PICC_REQIDL,
            RequestMode::All => PICC_REQALL,
        }
    }
}

/// Which sector key to authenticate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    KeyA,
    KeyB,
}

impl AuthMode {
    pub const fn code(self) -> u8 {
        match self {
            AuthMode::KeyA => PICC_AUTHENT1A,
            AuthMode::KeyB => PICC_AUTHENT1B,
        }
    }
}
