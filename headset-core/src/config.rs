//! Configuration type definitions.
//!
//! The firmware parses these from its embedded `headset.toml`; host tests
//! build them directly.

use crate::menu::PageCatalog;

/// AES link key length (the RFM69's hardware key size).
pub const ENCRYPTION_KEY_LEN: usize = 16;

/// Radio link configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    /// Center frequency in kHz (915000 = 915.0 MHz, US ISM band).
    pub frequency_khz: u32,
    /// Link-layer AES key, shared with the body controller.
    pub encryption_key: [u8; ENCRYPTION_KEY_LEN],
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency_khz: 915_000,
            encryption_key: [1, 2, 3, 4, 5, 6, 7, 8, 1, 2, 3, 4, 5, 6, 7, 8],
        }
    }
}

/// Display and main-loop configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Windowed surfaces start fullscreen; fixed panels ignore this.
    pub fullscreen: bool,
    /// Idle delay per tick in milliseconds. 0 busy-polls for minimum
    /// latency; raise it to trade latency for idle CPU.
    pub idle_tick_ms: u32,
    /// Page shown at startup.
    pub default_page: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fullscreen: false,
            idle_tick_ms: 0,
            default_page: 70,
        }
    }
}

/// Complete headset configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadsetConfig {
    pub radio: RadioConfig,
    pub display: DisplayConfig,
    pub pages: PageCatalog,
}
