//! Hardware integration for the astromech headset.
//!
//! Everything board-specific lives here: the RFM69 transceiver driver, the
//! SSD1306 OLED driver and the page surface drawn on it, the bonnet button
//! wiring, and the configuration parser. The logic these feed is in
//! `headset-core`.

#![no_std]
#![deny(unsafe_code)]

pub mod buttons;
pub mod config;
pub mod rfm69;
pub mod ssd1306;
pub mod surface;
