//! UID debouncing for scan loops.
//!
//! This is caller state: a scan loop owns a [`PresenceTracker`] and feeds it
//! the result of each poll. The driver itself keeps no memory of past cards.

use embedded_hal::delay::DelayNs;

use crate::card_types::Uid;
use crate::commands::RequestMode;
use crate::rfid_rc522::RfidRc522;
use crate::transport::Transport;

/// Typical pause between two polls of the field.
pub const SCAN_INTERVAL_MS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// A card that differs from the last one seen.
    Arrived(Uid),
    /// Same card as last poll.
    Present,
    /// The last card is gone.
    Departed(Uid),
    /// Still nothing in the field.
    Absent,
}

#[derive(Debug, Default, Clone)]
pub struct PresenceTracker {
    last: Option<Uid>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Uid> {
        self.last.as_ref()
    }

    pub fn observe(&mut self, seen: Option<Uid>) -> Presence {
        let presence = match (self.last, seen) {
            (Some(last), Some(uid)) if last == uid => Presence::Present,
            (_, Some(uid)) => Presence::Arrived(uid),
            (Some(last), None) => Presence::Departed(last),
            (None, None) => Presence::Absent,
        };
        self.last = seen;
        presence
    }
}

/// One poll of the field: REQA, then anticollision if something answered.
pub fn scan<T, D>(rfid: &mut RfidRc522<T, D>) -> Result<Option<Uid>, T::Error>
where
    T: Transport,
    D: DelayNs,
{
    let (status, _) = rfid.request(RequestMode::Idle)?;
    if !status.is_ok() {
        return Ok(None);
    }
    rfid.read_card_serial()
}
