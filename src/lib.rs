//! Driver for the MFRC522 contactless reader.
//!
//! Turns a byte-oriented bus into card presence detection, UID retrieval,
//! MIFARE Classic sector authentication and 16-byte block read/write.
//!
//! ```ignore
//! let transport = SpiTransport::new(spi, cs, rst)?;
//! let mut rfid = RfidRc522::new(transport, delay);
//! rfid.hard_reset()?;
//! rfid.init()?;
//!
//! if let Some(uid) = presence::scan(&mut rfid)? {
//!     if rfid.select_tag(&uid)? != 0 {
//!         let auth = rfid.authenticate(AuthMode::KeyA, 8, &DEFAULT_KEY, &uid.serial())?;
//!         if auth.is_ok() {
//!             let block = rfid.read_block(8)?;
//!         }
//!         rfid.stop_crypto()?;
//!     }
//! }
//! ```
#![cfg_attr(not(test), no_std)]
// src/lib.rs

pub mod card_types;
pub mod commands;
pub mod config;
pub mod errors;
pub mod picc;
pub mod presence;
pub mod registers;
pub mod rfid_rc522;
pub mod transport;

#[cfg(test)]
mod testutils;

pub use card_types::{CardType, Uid, DEFAULT_KEY};
pub use commands::{AuthMode, RequestMode};
pub use config::Config;
pub use errors::{BusError, Status};
pub use picc::AuthOutcome;
pub use rfid_rc522::RfidRc522;
pub use transport::{SpiTransport, Transport};
