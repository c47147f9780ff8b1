//! Menu Update Protocol
//!
//! This crate defines the radio protocol between the droid's body controller
//! (which owns the menu system) and the headset display. Packets travel over
//! a 915MHz RFM69 link; link-layer concerns (RadioHead-compatible framing,
//! CRC, AES encryption) belong to the transceiver driver, so what arrives
//! here is a bare payload of at most [`MAX_PAYLOAD_SIZE`] bytes.
//!
//! # Payload grammar
//!
//! A payload is UTF-8 text. The only command in the current protocol is page
//! selection: the payload spells the target page number as ASCII decimal
//! digits and nothing else (`"30"`, `"110"`). Page selection is atomic - a
//! packet replaces the whole visible page; there are no per-item updates.
//!
//! ```text
//! ┌─────────────────────────────┐
//! │ PAGE NUMBER (1-5 digits)    │   e.g. b"30" -> PageSelect(30)
//! └─────────────────────────────┘
//! ```
//!
//! Anything else - empty payloads, invalid UTF-8, non-digit text - decodes
//! to a [`DecodeError`] and leaves the headset's display untouched.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;

pub use command::{decode, DecodeError, MenuCommand};

/// Largest payload the link delivers: the RFM69 FIFO holds 66 bytes, of
/// which the length byte, the 4-byte RadioHead header and a spare go to the
/// link layer.
pub const MAX_PAYLOAD_SIZE: usize = 60;
