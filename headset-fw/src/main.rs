//! Astromech headset firmware
//!
//! Receives menu-page selections from the droid's body controller over the
//! 915MHz link and renders the active page on the dome OLED, polling the
//! three bonnet buttons as it goes. Everything runs in one cooperative
//! loop: radio poll, button poll, display refresh, every tick.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Delay, Duration, Instant, Timer};
use {defmt_rtt as _, panic_probe as _};

use headset_core::config::HeadsetConfig;
use headset_core::controller::{Controller, RxOutcome, RxStatus, TickReport};
use headset_core::menu::MenuStore;
use headset_core::traits::input::Button;
use headset_core::traits::surface::{DisplaySurface, ElementId};
use headset_fw::buttons::BonnetButtons;
use headset_fw::config::parse_config;
use headset_fw::rfm69::Rfm69;
use headset_fw::ssd1306::Ssd1306;
use headset_fw::surface::OledSurface;

/// Embedded default configuration (compiled into the firmware).
/// Edit headset.toml and rebuild to customize.
const EMBEDDED_CONFIG: &str = include_str!("../headset.toml");

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("headset firmware starting");

    let p = embassy_rp::init(Default::default());

    // build.rs validated the embedded file on the host
    let config = parse_config(EMBEDDED_CONFIG).unwrap();
    let HeadsetConfig {
        radio: radio_config,
        display: display_config,
        pages,
    } = config;
    info!(
        "config loaded: {} pages, default page {}",
        pages.len(),
        display_config.default_page
    );

    // Radio bonnet on SPI0 (SCK=18, MOSI=19, MISO=16, CS=17, RESET=20)
    let mut spi_config = spi::Config::default();
    spi_config.frequency = 2_000_000;
    let spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let rst = Output::new(p.PIN_20, Level::Low);

    let mut delay = Delay;
    let mut rfm = Rfm69::attach(spi, cs, rst);
    let radio = match rfm
        .reset(&mut delay)
        .and_then(|()| rfm.init(&radio_config, &mut delay))
    {
        Ok(()) => {
            info!("Radio initialized!  Waiting on receive...");
            Some(rfm)
        }
        Err(e) => {
            // not fatal: the loop runs radio-less, pages change only via
            // the direct path (or never) - stale display beats no display
            warn!("RFM69: ERROR! ({:?}) - continuing without radio", e);
            None
        }
    };

    // Dome OLED on I2C1 (SDA=2, SCL=3)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = 400_000;
    let i2c = I2c::new_blocking(p.I2C1, p.PIN_3, p.PIN_2, i2c_config);
    let mut oled = Ssd1306::new(i2c);
    if oled.init().is_err() {
        warn!("OLED init failed; rendering blind");
    }
    let mut surface = OledSurface::new(oled);
    surface.set_fullscreen(display_config.fullscreen);

    let buttons = BonnetButtons::new(
        Input::new(p.PIN_5, Pull::Up),
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_12, Pull::Up),
    );

    let store = MenuStore::new(pages).unwrap();
    let mut controller = Controller::new(radio, buttons, surface, store);
    if let Err(e) = controller.select_page(display_config.default_page) {
        warn!(
            "default page {} missing: {:?}",
            display_config.default_page, e
        );
    }

    // startup flash check on the last two item cells, staggered so they
    // alternate
    let now = Instant::now().as_millis();
    controller.start_flash(ElementId::Item(6), 0, now);
    controller.start_flash(ElementId::Item(7), 16, now);

    let idle_ms = display_config.idle_tick_ms as u64;
    info!("entering main loop");
    loop {
        let report = controller.tick(Instant::now().as_millis());
        log_report(&report);

        if report.shutdown_requested() {
            info!("all three buttons held - stopping");
            break;
        }

        if idle_ms > 0 {
            Timer::after(Duration::from_millis(idle_ms)).await;
        } else {
            // busy-poll, but keep the executor's timer queue serviced
            yield_now().await;
        }
    }
    info!("main loop stopped");
}

fn log_report(report: &TickReport) {
    match &report.rx {
        RxStatus::Received {
            len,
            text,
            empty_polls,
            outcome,
        } => {
            match text {
                Some(text) => info!("RX: {} in time: {}", text.as_str(), empty_polls),
                None => info!("RX: {} raw bytes in time: {}", len, empty_polls),
            }
            match outcome {
                RxOutcome::PageChanged(n) => info!("menu page {} selected", n),
                RxOutcome::UnknownPage(n) => warn!("no menu page {} in the catalog", n),
                RxOutcome::BadPacket(e) => warn!("malformed packet: {:?}", e),
            }
        }
        RxStatus::TransportError(e) => warn!("radio receive failed: {:?}", e),
        RxStatus::Empty { .. } | RxStatus::NoRadio => {}
    }

    for button in Button::ALL {
        if report.is_pressed(button) {
            info!("Button {:?} pressed", button);
        }
        if report.input_faults[button.index()] {
            warn!("Button {:?} read failed", button);
        }
    }

    if let Some(e) = &report.render_error {
        warn!("display refresh failed: {:?}", e);
    }
}
