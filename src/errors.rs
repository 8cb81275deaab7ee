use ufmt::{uDebug, uWrite};

/// Outcome of a card-level exchange.
///
/// Chip and card faults are values, not errors: a missing card is the normal
/// case while polling. Only the bus itself produces a `Result::Err`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// No card answered before the chip timer expired.
    NoTag,
    /// Framing, parity, buffer, collision or protocol fault, a malformed
    /// response, or an exhausted poll budget.
    Error,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl uDebug for Status {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            Status::Ok => f.write_str("Ok"),
            Status::NoTag => f.write_str("NoTag"),
            Status::Error => f.write_str("Error"),
        }
    }
}

/// Failure of the shipped SPI transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError<S, P> {
    /// SPI transfer failed
    Spi(S),
    /// Chip-select or reset pin could not be driven
    Pin(P),
}

impl<S, P> uDebug for BusError<S, P> {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            BusError::Spi(_) => f.write_str("Spi"),
            BusError::Pin(_) => f.write_str("Pin"),
        }
    }
}
