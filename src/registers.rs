// src/registers.rs

/// MFRC522 register map (datasheet section 9).
///
/// Discriminants are the raw 6-bit addresses; the SPI framing shift happens
/// in [`Register::read_address`] and [`Register::write_address`].
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    // Command and status
    Command = 0x01,
    ComIEn = 0x02,            // Communication interrupt enable
    DivIEn = 0x03,            // DivIrq interrupt enable
    ComIrq = 0x04,            // Interrupt request bits
    DivIrq = 0x05,            // CRC / MFIN interrupt request bits
    Error = 0x06,             // Error bits of the last command
    Status1 = 0x07,
    Status2 = 0x08,           // Receiver/transmitter status, MFCrypto1On
    FifoData = 0x09,
    FifoLevel = 0x0A,         // Bytes stored in the FIFO, bit 7 flushes
    WaterLevel = 0x0B,
    Control = 0x0C,           // RxLastBits live in bits 0..2
    BitFraming = 0x0D,        // StartSend, TxLastBits
    Coll = 0x0E,

    // Communication configuration
    Mode = 0x11,
    TxMode = 0x12,
    RxMode = 0x13,
    TxControl = 0x14,         // Antenna driver pins TX1 / TX2
    TxAsk = 0x15,
    TxSel = 0x16,
    RxSel = 0x17,
    RxThreshold = 0x18,
    Demod = 0x19,
    MfTx = 0x1C,
    MfRx = 0x1D,
    SerialSpeed = 0x1F,

    // Configuration
    CrcResultHigh = 0x21,
    CrcResultLow = 0x22,
    ModWidth = 0x24,
    RfCfg = 0x26,             // Receiver gain
    GsN = 0x27,
    CwGsP = 0x28,
    ModGsP = 0x29,
    TMode = 0x2A,
    TPrescaler = 0x2B,
    TReloadHigh = 0x2C,
    TReloadLow = 0x2D,
    TCounterValueHigh = 0x2E,
    TCounterValueLow = 0x2F,

    // Test
    TestSel1 = 0x31,
    TestSel2 = 0x32,
    TestPinEn = 0x33,
    TestPinValue = 0x34,
    TestBus = 0x35,
    AutoTest = 0x36,
    Version = 0x37,           // Chip software version
    AnalogTest = 0x38,
    TestDac1 = 0x39,
    TestDac2 = 0x3A,
    TestAdc = 0x3B,
}

impl Register {
    /// Raw 6-bit register address.
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// First SPI byte for a register write: bit 7 clear, bit 0 unused.
    pub const fn write_address(self) -> u8 {
        (self.addr() << 1) & 0x7E
    }

    /// First SPI byte for a register read: bit 7 set.
    pub const fn read_address(self) -> u8 {
        self.write_address() | 0x80
    }
}

// ComIrq / ComIEn bits
pub const IRQ_SET1: u8 = 0x80;
pub const IRQ_TX: u8 = 0x40;
pub const IRQ_RX: u8 = 0x20;
pub const IRQ_IDLE: u8 = 0x10;
pub const IRQ_HI_ALERT: u8 = 0x08;
pub const IRQ_LO_ALERT: u8 = 0x04;
pub const IRQ_ERR: u8 = 0x02;
pub const IRQ_TIMER: u8 = 0x01;

// DivIrq bits
pub const DIV_IRQ_CRC: u8 = 0x04;

// Error register. CRCErr is not part of the fault mask.
pub const ERROR_BUFFER_OVERFLOW: u8 = 0x10;
pub const ERROR_COLLISION: u8 = 0x08;
pub const ERROR_CRC: u8 = 0x04;
pub const ERROR_PARITY: u8 = 0x02;
pub const ERROR_PROTOCOL: u8 = 0x01;
pub const ERROR_MASK: u8 = ERROR_BUFFER_OVERFLOW | ERROR_COLLISION | ERROR_PARITY | ERROR_PROTOCOL;

// FIFOLevel
pub const FIFO_FLUSH: u8 = 0x80;

// BitFraming
pub const BIT_FRAMING_START_SEND: u8 = 0x80;

// Control
pub const CONTROL_RX_LAST_BITS: u8 = 0x07;

// Status2
pub const STATUS2_CRYPTO1_ON: u8 = 0x08;

// TxControl
pub const TX_CONTROL_ANTENNA: u8 = 0x03;

// RFCfg receiver gain field
pub const RF_CFG_GAIN_MASK: u8 = 0x70;
