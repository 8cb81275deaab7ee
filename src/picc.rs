//! Card-level protocol: REQUEST, anticollision, SELECT, MIFARE Classic
//! authentication and block I/O.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::card_types::{Block, Key, Uid, BLOCK_SIZE, CLASSIC_1K_BLOCKS};
use crate::commands::*;
use crate::errors::Status;
use crate::registers::{Register, STATUS2_CRYPTO1_ON};
use crate::rfid_rc522::{RfidRc522, Transceived};
use crate::transport::Transport;

/// Bits in an ATQA.
const ATQA_BITS: usize = 16;
/// SAK plus CRC_A.
const SAK_BITS: usize = 24;
/// A MIFARE ACK/NAK is a single nibble.
const ACK_BITS: usize = 4;

/// Authentication reports both the exchange status and the chip's crypto
/// flag; only both together mean the sector is open.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthOutcome {
    pub status: Status,
    pub crypto_on: bool,
}

impl AuthOutcome {
    pub fn is_ok(&self) -> bool {
        self.status.is_ok() && self.crypto_on
    }
}

fn is_ack(back: &Transceived) -> bool {
    back.status == Status::Ok
        && back.bits == ACK_BITS
        && back.data.first().map_or(false, |b| b & 0x0F == MIFARE_ACK)
}

impl<T, D> RfidRc522<T, D>
where
    T: Transport,
    D: DelayNs,
{
    /// Sends REQA or WUPA as a 7-bit short frame. Returns `Ok` only for a
    /// full 16-bit ATQA, along with the received bit count.
    pub fn request(&mut self, mode: RequestMode) -> Result<(Status, usize), T::Error> {
        self.write_register(Register::BitFraming, 0x07)?;
        let back = self.to_card(Command::Transceive, &[mode.code()])?;

        let status = if back.status == Status::Ok && back.bits == ATQA_BITS {
            Status::Ok
        } else {
            Status::Error
        };
        Ok((status, back.bits))
    }

    /// Cascade level 1 anticollision. The UID is returned only with `Ok`,
    /// after its BCC has been checked.
    pub fn anticollide(&mut self) -> Result<(Status, Option<Uid>), T::Error> {
        self.write_register(Register::BitFraming, 0x00)?;
        let back = self.to_card(Command::Transceive, &[PICC_ANTICOLL, NVB_ANTICOLL])?;
        if back.status != Status::Ok {
            return Ok((back.status, None));
        }

        match <[u8; 5]>::try_from(&back.data[..]).ok().and_then(Uid::new) {
            Some(uid) => Ok((Status::Ok, Some(uid))),
            None => {
                debug!("anticollision answer rejected: {:02X?}", &back.data[..]);
                Ok((Status::Error, None))
            }
        }
    }

    /// Selects the card with `uid`. Returns its SAK, or 0 if the card did
    /// not answer with exactly 24 bits.
    pub fn select_tag(&mut self, uid: &Uid) -> Result<u8, T::Error> {
        let mut frame = [0u8; 9];
        frame[0] = PICC_SELECTTAG;
        frame[1] = NVB_SELECT;
        frame[2..7].copy_from_slice(uid.as_bytes());
        let crc = self.calculate_crc(&frame[..7])?;
        frame[7..].copy_from_slice(&crc);

        let back = self.to_card(Command::Transceive, &frame)?;
        if back.status == Status::Ok && back.bits == SAK_BITS {
            Ok(back.data.first().copied().unwrap_or(0))
        } else {
            Ok(0)
        }
    }

    /// Crypto1 authentication of the sector holding `block`. Pair every call
    /// with [`stop_crypto`](Self::stop_crypto) before talking to another card.
    pub fn authenticate(
        &mut self,
        mode: AuthMode,
        block: u8,
        key: &Key,
        serial: &[u8; 4],
    ) -> Result<AuthOutcome, T::Error> {
        let mut frame = [0u8; 12];
        frame[0] = mode.code();
        frame[1] = block;
        frame[2..8].copy_from_slice(key);
        frame[8..].copy_from_slice(serial);

        let back = self.to_card(Command::Authent, &frame)?;
        let crypto_on = self.read_register(Register::Status2)? & STATUS2_CRYPTO1_ON != 0;

        let outcome = AuthOutcome {
            status: back.status,
            crypto_on,
        };
        if !outcome.is_ok() {
            warn!(
                "authentication of block {} failed: {:?}, crypto1 {}",
                block,
                back.status,
                if crypto_on { "on" } else { "off" }
            );
        }
        Ok(outcome)
    }

    /// Reads one 16-byte block from an authenticated sector.
    pub fn read_block(&mut self, addr: u8) -> Result<Option<Block>, T::Error> {
        let mut frame = [PICC_READ, addr, 0, 0];
        let crc = self.calculate_crc(&frame[..2])?;
        frame[2..].copy_from_slice(&crc);

        let back = self.to_card(Command::Transceive, &frame)?;
        if back.status != Status::Ok {
            warn!("reading block {} failed: {:?}", addr, back.status);
        }
        Ok(Block::try_from(&back.data[..]).ok())
    }

    /// Writes one block in two round trips: the WRITE command, then the
    /// data. Both are always sent; either missing its ACK makes the result
    /// `Error`.
    pub fn write_block(&mut self, addr: u8, data: &Block) -> Result<Status, T::Error> {
        let mut status = Status::Ok;

        let mut command = [PICC_WRITE, addr, 0, 0];
        let crc = self.calculate_crc(&command[..2])?;
        command[2..].copy_from_slice(&crc);
        let back = self.to_card(Command::Transceive, &command)?;
        if !is_ack(&back) {
            warn!("block {} refused WRITE: {:?}, {} bits", addr, back.status, back.bits);
            status = Status::Error;
        }

        let mut payload = [0u8; BLOCK_SIZE + 2];
        payload[..BLOCK_SIZE].copy_from_slice(data);
        let crc = self.calculate_crc(data)?;
        payload[BLOCK_SIZE..].copy_from_slice(&crc);
        let back = self.to_card(Command::Transceive, &payload)?;
        if !is_ack(&back) {
            warn!("block {} refused data: {:?}, {} bits", addr, back.status, back.bits);
            status = Status::Error;
        }

        Ok(status)
    }

    /// Leaves the crypto session. Safe to call at any time.
    pub fn stop_crypto(&mut self) -> Result<(), T::Error> {
        self.clear_bits(Register::Status2, STATUS2_CRYPTO1_ON)
    }

    /// HLTA. A halted card does not answer, so a timeout is success.
    pub fn halt(&mut self) -> Result<Status, T::Error> {
        let mut frame = [PICC_HALT, 0x00, 0, 0];
        let crc = self.calculate_crc(&frame[..2])?;
        frame[2..].copy_from_slice(&crc);

        let back = self.to_card(Command::Transceive, &frame)?;
        Ok(match back.status {
            Status::NoTag => Status::Ok,
            _ => Status::Error,
        })
    }

    /// Is there a card in the field answering REQA?
    pub fn is_new_card_present(&mut self) -> Result<bool, T::Error> {
        let (status, _) = self.request(RequestMode::Idle)?;
        Ok(status.is_ok())
    }

    /// Anticollision, keeping only a checked UID.
    pub fn read_card_serial(&mut self) -> Result<Option<Uid>, T::Error> {
        let (_, uid) = self.anticollide()?;
        Ok(uid)
    }

    /// Authenticates every block of a Classic 1K card with key A and reads
    /// it, handing each result to `visit`. Crypto is stopped at the end.
    pub fn dump_classic_1k<F>(&mut self, key: &Key, serial: &[u8; 4], mut visit: F) -> Result<(), T::Error>
    where
        F: FnMut(u8, Option<Block>),
    {
        for block in 0..CLASSIC_1K_BLOCKS {
            let auth = self.authenticate(AuthMode::KeyA, block, key, serial)?;
            let data = if auth.is_ok() {
                self.read_block(block)?
            } else {
                None
            };
            visit(block, data);
        }
        self.stop_crypto()
    }
}
