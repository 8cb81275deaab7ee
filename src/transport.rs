// src/transport.rs

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::errors::BusError;

/// The two primitives the driver needs from the board.
pub trait Transport {
    type Error;

    /// Half-duplex exchange: `frame` is clocked out and overwritten in place
    /// with the bytes clocked in, one for one.
    fn transfer(&mut self, frame: &mut [u8]) -> Result<(), Self::Error>;

    /// Drives the chip's NRSTPD line.
    fn set_reset(&mut self, high: bool) -> Result<(), Self::Error>;
}

/// SPI bus with a manually driven chip-select and a reset pin.
pub struct SpiTransport<SPI, CS, RST> {
    spi: SPI,
    cs: CS,
    rst: RST,
}

impl<SPI, CS, RST, P> SpiTransport<SPI, CS, RST>
where
    SPI: SpiBus<u8>,
    CS: OutputPin<Error = P>,
    RST: OutputPin<Error = P>,
{
    /// Takes the bus and both pins. Chip-select is released (driven high).
    pub fn new(spi: SPI, mut cs: CS, rst: RST) -> Result<Self, BusError<SPI::Error, P>> {
        cs.set_high().map_err(BusError::Pin)?;
        Ok(SpiTransport { spi, cs, rst })
    }

    pub fn release(self) -> (SPI, CS, RST) {
        (self.spi, self.cs, self.rst)
    }
}

impl<SPI, CS, RST, P> Transport for SpiTransport<SPI, CS, RST>
where
    SPI: SpiBus<u8>,
    CS: OutputPin<Error = P>,
    RST: OutputPin<Error = P>,
{
    type Error = BusError<SPI::Error, P>;

    fn transfer(&mut self, frame: &mut [u8]) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(BusError::Pin)?;
        let result = self
            .spi
            .transfer_in_place(frame)
            .and_then(|_| self.spi.flush())
            .map_err(BusError::Spi);
        // Release chip-select even when the transfer failed.
        self.cs.set_high().map_err(BusError::Pin)?;
        result
    }

    fn set_reset(&mut self, high: bool) -> Result<(), Self::Error> {
        if high {
            self.rst.set_high().map_err(BusError::Pin)
        } else {
            self.rst.set_low().map_err(BusError::Pin)
        }
    }
}
