#![no_std]
#![no_main]

use arduino_hal::default_serial;
use arduino_hal::spi;
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Mode, Phase, Polarity};
use panic_halt as _;
use rc522_nfc::presence::{self, Presence, PresenceTracker, SCAN_INTERVAL_MS};
use rc522_nfc::rfid_rc522::ChipVersion;
use rc522_nfc::{AuthMode, CardType, RfidRc522, SpiTransport, DEFAULT_KEY};
use ufmt::uwriteln;

const DATA_BLOCK: u8 = 8;

#[arduino_hal::entry]
fn main() -> ! {
    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);

    let mut serial = default_serial!(dp, pins, 9600);

    let settings = spi::Settings {
        data_order: spi::DataOrder::MostSignificantFirst,
        mode: Mode {
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
        },
        clock: spi::SerialClockRate::OscfOver64,
    };

    let sclk = pins.d13.into_output();
    let mosi = pins.d11.into_output();
    let miso = pins.d12.into_pull_up_input();
    let cs = pins.d10.into_output();
    let (spi, cs_pin) = spi::Spi::new(dp.SPI, sclk, mosi, miso, cs, settings);

    let rst = pins.d9.into_output(); // Reset pin

    let transport = SpiTransport::new(spi, cs_pin, rst).unwrap();
    let mut rfid = RfidRc522::new(transport, arduino_hal::Delay::new());
    rfid.hard_reset().unwrap();
    rfid.init().unwrap();

    let version = rfid.chip_version().unwrap();
    uwriteln!(&mut serial, "MFRC522: {:?}", version).ok();
    if version == ChipVersion::NoResponse {
        uwriteln!(&mut serial, "No answer on SPI, check wiring").ok();
    }

    let mut pace = arduino_hal::Delay::new();
    let mut tracker = PresenceTracker::new();
    loop {
        let seen = presence::scan(&mut rfid).unwrap();
        match tracker.observe(seen) {
            Presence::Arrived(uid) => {
                uwriteln!(&mut serial, "Card UID: {}", uid).ok();

                let sak = rfid.select_tag(&uid).unwrap();
                let card_type = CardType::from_sak(sak);
                uwriteln!(&mut serial, "Card type: {:?}", card_type).ok();

                let auth = rfid
                    .authenticate(AuthMode::KeyA, DATA_BLOCK, &DEFAULT_KEY, &uid.serial())
                    .unwrap();
                if auth.is_ok() {
                    match rfid.read_block(DATA_BLOCK).unwrap() {
                        Some(block) => {
                            uwriteln!(&mut serial, "Block {}: {:?}", DATA_BLOCK, block).ok();
                        }
                        None => {
                            uwriteln!(&mut serial, "Block {} unreadable", DATA_BLOCK).ok();
                        }
                    }
                } else {
                    uwriteln!(&mut serial, "Authentication failed: {:?}", auth.status).ok();
                }
                rfid.stop_crypto().unwrap();
            }
            Presence::Departed(uid) => {
                uwriteln!(&mut serial, "Card removed: {}", uid).ok();
            }
            Presence::Present | Presence::Absent => {}
        }

        pace.delay_ms(SCAN_INTERVAL_MS);
    }
}
