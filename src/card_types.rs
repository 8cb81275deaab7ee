use core::fmt::{Debug, Formatter, Result};
use ufmt::{uDebug, uDisplay, uWrite};

/// 6-byte MIFARE Classic sector key.
pub type Key = [u8; 6];

/// Factory default key A/B.
pub const DEFAULT_KEY: Key = [0xFF; 6];

/// One 16-byte MIFARE Classic block.
pub type Block = [u8; 16];

pub const BLOCK_SIZE: usize = 16;

/// Blocks on a Classic 1K card.
pub const CLASSIC_1K_BLOCKS: u8 = 64;

/// Card family, decoded from the select acknowledge (the "size" byte).
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    MifareMini,
    Mifare1K,
    Mifare4K,
    MifareUltralight,
    MifarePlus,
    Iso14443_4,
    Iso18092,
    /// Cascade bit set; the UID continues at the next level.
    UidNotComplete,
    Unknown,
}

impl CardType {
    pub fn from_sak(sak: u8) -> Self {
        // Bit 8 is ignored, some vendors set it (NXP AN10833 section 3.2).
        match sak & 0x7F {
            0x04 => CardType::UidNotComplete,
            0x09 => CardType::MifareMini,
            0x08 => CardType::Mifare1K,
            0x18 => CardType::Mifare4K,
            0x00 => CardType::MifareUltralight,
            0x10 | 0x11 => CardType::MifarePlus,
            0x20 => CardType::Iso14443_4,
            0x40 => CardType::Iso18092,
            _ => CardType::Unknown,
        }
    }

    /// Cards that speak Crypto1 sector authentication.
    pub fn is_mifare_classic(self) -> bool {
        matches!(self, CardType::MifareMini | CardType::Mifare1K | CardType::Mifare4K)
    }

    fn name(self) -> &'static str {
        match self {
            CardType::MifareMini => "MifareMini",
            CardType::Mifare1K => "Mifare1K",
            CardType::Mifare4K => "Mifare4K",
            CardType::MifareUltralight => "MifareUltralight",
            CardType::MifarePlus => "MifarePlus",
            CardType::Iso14443_4 => "Iso14443_4",
            CardType::Iso18092 => "Iso18092",
            CardType::UidNotComplete => "UidNotComplete",
            CardType::Unknown => "Unknown",
        }
    }
}

impl Debug for CardType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())
    }
}

impl uDebug for CardType {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.name())
    }
}

/// Single-size UID as returned by anticollision: 4 serial bytes and the BCC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid {
    bytes: [u8; 5],
}

impl Uid {
    /// Wraps a raw anticollision answer. Returns `None` if the BCC does not
    /// match the XOR of the serial bytes.
    pub fn new(bytes: [u8; 5]) -> Option<Self> {
        if bcc(&[bytes[0], bytes[1], bytes[2], bytes[3]]) == bytes[4] {
            Some(Uid { bytes })
        } else {
            None
        }
    }

    /// Builds a UID from the serial bytes, computing the BCC.
    pub fn from_serial(serial: [u8; 4]) -> Self {
        Uid {
            bytes: [serial[0], serial[1], serial[2], serial[3], bcc(&serial)],
        }
    }

    pub fn serial(&self) -> [u8; 4] {
        [self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[4]
    }

    /// All five bytes, as sent in SELECT.
    pub fn as_bytes(&self) -> &[u8; 5] {
        &self.bytes
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(self.serial())
    }
}

/// Block check character: XOR of the serial bytes.
pub fn bcc(serial: &[u8; 4]) -> u8 {
    serial.iter().fold(0, |acc, b| acc ^ b)
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Prints as `04:1A:2B:3C`.
impl uDisplay for Uid {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        for (i, b) in self.serial().iter().enumerate() {
            if i > 0 {
                f.write_char(':')?;
            }
            f.write_char(HEX[(b >> 4) as usize] as char)?;
            f.write_char(HEX[(b & 0x0F) as usize] as char)?;
        }
        Ok(())
    }
}

impl uDebug for Uid {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uDisplay::fmt(self, f)
    }
}
