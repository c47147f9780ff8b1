//! Minimal TOML parser for the headset configuration.
//!
//! This handles only the subset `headset.toml` uses; it does NOT support
//! the full TOML spec. The real `toml` crate validates the same file on the
//! host at build time, so by the time this parser runs the input is known
//! to be well-formed TOML.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers and [page.N] headers
//! - Arrays of strings: items = ["a", "b", ...]
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings, escapes inside strings
//! - Datetime values
//! - Inline tables

use heapless::Vec;

use headset_core::config::{HeadsetConfig, ENCRYPTION_KEY_LEN};
use headset_core::menu::{MenuError, MenuPage, MAX_ITEMS};

/// Parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header.
    InvalidSection,
    /// Invalid value for a known key.
    InvalidValue,
    /// A page definition is incomplete (missing title, item count != 8).
    InvalidPage,
    /// Two [page.N] sections share a number.
    DuplicatePage(u16),
    /// More pages than the catalog holds.
    TooManyPages,
}

/// Current parsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Radio,
    Display,
    Page(u16),
}

/// A `[page.N]` section under construction; labels borrow from the input.
struct PageBuilder<'a> {
    number: u16,
    title: Option<&'a str>,
    items: Vec<&'a str, MAX_ITEMS>,
}

impl<'a> PageBuilder<'a> {
    fn new(number: u16) -> Self {
        Self {
            number,
            title: None,
            items: Vec::new(),
        }
    }
}

/// Parse TOML configuration into a [`HeadsetConfig`].
pub fn parse_config(input: &str) -> Result<HeadsetConfig, ParseError> {
    let mut config = HeadsetConfig::default();
    let mut section = Section::Root;
    let mut current_page: Option<PageBuilder> = None;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Check for section header
        if line.starts_with('[') && line.ends_with(']') {
            save_page(&mut config, &mut current_page)?;
            section = parse_section_header(&line[1..line.len() - 1])?;
            if let Section::Page(number) = section {
                current_page = Some(PageBuilder::new(number));
            }
            continue;
        }

        let (key, value) = split_kv(line)?;
        match section {
            Section::Root => return Err(ParseError::InvalidSection),
            Section::Radio => apply_radio(&mut config, key, value)?,
            Section::Display => apply_display(&mut config, key, value)?,
            Section::Page(_) => {
                let page = current_page.as_mut().ok_or(ParseError::InvalidPage)?;
                apply_page(page, key, value)?;
            }
        }
    }

    save_page(&mut config, &mut current_page)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();
    match header {
        "radio" => Ok(Section::Radio),
        "display" => Ok(Section::Display),
        _ => {
            let number = header
                .strip_prefix("page.")
                .and_then(|n| n.parse::<u16>().ok())
                .ok_or(ParseError::InvalidSection)?;
            Ok(Section::Page(number))
        }
    }
}

fn split_kv(line: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = line.split_once('=').ok_or(ParseError::InvalidValue)?;
    Ok((key.trim(), value.trim()))
}

fn apply_radio(config: &mut HeadsetConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "frequency_khz" => config.radio.frequency_khz = parse_int(value)?,
        "encryption_key" => config.radio.encryption_key = parse_hex_key(value)?,
        _ => {} // unknown keys are tolerated for forward compatibility
    }
    Ok(())
}

fn apply_display(config: &mut HeadsetConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "fullscreen" => config.display.fullscreen = parse_bool(value)?,
        "idle_tick_ms" => config.display.idle_tick_ms = parse_int(value)?,
        "default_page" => config.display.default_page = parse_int(value)?,
        _ => {}
    }
    Ok(())
}

fn apply_page<'a>(
    page: &mut PageBuilder<'a>,
    key: &str,
    value: &'a str,
) -> Result<(), ParseError> {
    match key {
        "title" => page.title = Some(unquote(value)?),
        "items" => parse_string_array(value, &mut page.items)?,
        _ => {}
    }
    Ok(())
}

/// Finish the in-progress page and push it into the catalog.
fn save_page(
    config: &mut HeadsetConfig,
    current_page: &mut Option<PageBuilder>,
) -> Result<(), ParseError> {
    let Some(page) = current_page.take() else {
        return Ok(());
    };

    let title = page.title.ok_or(ParseError::InvalidPage)?;
    let number = page.number;
    if page.items.len() != MAX_ITEMS {
        return Err(ParseError::InvalidPage);
    }
    let mut items: [&str; MAX_ITEMS] = [""; MAX_ITEMS];
    for (slot, item) in items.iter_mut().zip(page.items.iter()) {
        *slot = item;
    }

    config
        .pages
        .push(MenuPage::new(number, title, items))
        .map_err(|e| match e {
            MenuError::DuplicatePage(n) => ParseError::DuplicatePage(n),
            MenuError::TooManyPages => ParseError::TooManyPages,
            _ => ParseError::InvalidPage,
        })
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn unquote(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)
}

/// The 16-byte AES key, spelled as 32 hex digits.
fn parse_hex_key(value: &str) -> Result<[u8; ENCRYPTION_KEY_LEN], ParseError> {
    let hex = unquote(value)?.as_bytes();
    if hex.len() != ENCRYPTION_KEY_LEN * 2 {
        return Err(ParseError::InvalidValue);
    }

    let mut key = [0u8; ENCRYPTION_KEY_LEN];
    for (i, pair) in hex.chunks_exact(2).enumerate() {
        let hi = hex_nibble(pair[0]).ok_or(ParseError::InvalidValue)?;
        let lo = hex_nibble(pair[1]).ok_or(ParseError::InvalidValue)?;
        key[i] = (hi << 4) | lo;
    }
    Ok(key)
}

fn hex_nibble(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

/// Parse `["a", "b", ...]` into borrowed labels.
fn parse_string_array<'a>(
    value: &'a str,
    out: &mut Vec<&'a str, MAX_ITEMS>,
) -> Result<(), ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut rest = inner.trim_start();
    while !rest.is_empty() {
        let body = rest.strip_prefix('"').ok_or(ParseError::InvalidValue)?;
        let end = body.find('"').ok_or(ParseError::InvalidValue)?;
        out.push(&body[..end]).map_err(|_| ParseError::InvalidPage)?;

        rest = body[end + 1..].trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma.trim_start();
        } else if !rest.is_empty() {
            return Err(ParseError::InvalidValue);
        }
    }
    Ok(())
}
