//! Configuration loading.
//!
//! The headset reads its configuration from `headset.toml`, embedded at
//! build time (`include_str!`) and syntax-checked on the host by build.rs.
//! Parsing on target uses a minimal TOML subset parser.

pub mod toml;

pub use toml::{parse_config, ParseError};
