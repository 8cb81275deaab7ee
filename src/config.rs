/// Iteration cap for the CRC coprocessor poll. Counts register reads, not time.
pub const CRC_POLL_BUDGET: u16 = 255;

/// Iteration cap for the command-completion poll. Counts register reads, not
/// time: on a fast host it may expire before the chip timer does.
pub const TRANSCEIVE_POLL_BUDGET: u16 = 2000;

/// Receiver gain (RFCfg bits 4..6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RxGain {
    Db18 = 0b000,
    Db23 = 0b001,
    Db33 = 0b100,
    Db38 = 0b101,
    Db43 = 0b110,
    Db48 = 0b111,
}

impl RxGain {
    pub const fn bits(self) -> u8 {
        (self as u8) << 4
    }
}

/// Driver tuning. `Default` reproduces the classic polling behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub crc_poll_budget: u16,
    pub transceive_poll_budget: u16,
    /// Pause between polls in microseconds. Zero spins. Non-zero turns each
    /// budget into a rough deadline of `budget * interval`.
    pub poll_interval_us: u32,
    /// Written during `init` when set; otherwise the chip's reset value stays.
    pub antenna_gain: Option<RxGain>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            crc_poll_budget: CRC_POLL_BUDGET,
            transceive_poll_budget: TRANSCEIVE_POLL_BUDGET,
            poll_interval_us: 0,
            antenna_gain: None,
        }
    }
}

impl Config {
    pub fn with_poll_interval_us(mut self, us: u32) -> Self {
        self.poll_interval_us = us;
        self
    }

    pub fn with_antenna_gain(mut self, gain: RxGain) -> Self {
        self.antenna_gain = Some(gain);
        self
    }

    pub fn with_poll_budgets(mut self, crc: u16, transceive: u16) -> Self {
        self.crc_poll_budget = crc;
        self.transceive_poll_budget = transceive;
        self
    }
}
