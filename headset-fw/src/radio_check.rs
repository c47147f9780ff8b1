//! Radio-presence / button diagnostic tool.
//!
//! Bring-up check for the bonnet before the real firmware goes on: probes
//! the RFM69 version register every pass and echoes button presses, at a
//! relaxed 100ms cadence.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Delay, Timer};
use {defmt_rtt as _, panic_probe as _};

use headset_core::traits::input::{Button, ButtonInput};
use headset_fw::buttons::BonnetButtons;
use headset_fw::rfm69::Rfm69;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let mut spi_config = spi::Config::default();
    spi_config.frequency = 2_000_000;
    let spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let rst = Output::new(p.PIN_20, Level::Low);

    let mut delay = Delay;
    let mut radio = Rfm69::attach(spi, cs, rst);
    if radio.reset(&mut delay).is_err() {
        warn!("could not pulse the radio reset line");
    }

    let mut buttons = BonnetButtons::new(
        Input::new(p.PIN_5, Pull::Up),
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_12, Pull::Up),
    );

    loop {
        // presence probe every pass; a pulled module shows up immediately
        match radio.probe() {
            Ok(()) => info!("RFM69: Detected"),
            Err(_) => info!("RFM69: ERROR!"),
        }

        for button in Button::ALL {
            if buttons.is_pressed(button).unwrap_or(false) {
                info!("{}", button.check_label());
                Timer::after_millis(100).await;
            }
        }

        Timer::after_millis(100).await;
    }
}
