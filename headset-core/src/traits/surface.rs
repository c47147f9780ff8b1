//! Display surface capability and layout helpers.
//!
//! The surface renders whole pages from the active snapshot; it never
//! reaches into the catalog. Font sizing and the item grid are fixed policy
//! shared by every surface, so those helpers live here where they can be
//! unit tested.

use crate::menu::ActivePage;

/// Errors from the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SurfaceError {
    /// Communication error with the display hardware.
    Communication,
    /// Display not initialized.
    NotInitialized,
}

/// The flashable display elements. Each has a foreground/background color
/// pair owned by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ElementId {
    PageNumber,
    Title,
    /// Item slot 0-7.
    Item(u8),
}

/// A rendering target for the menu page.
pub trait DisplaySurface {
    /// Re-render the whole page layout from the active snapshot.
    ///
    /// Implementations are free to skip work when nothing changed since the
    /// last render; the main loop calls this every tick.
    fn render_page(&mut self, page: &ActivePage) -> Result<(), SurfaceError>;

    /// Swap an element's foreground and background colors. Driven by the
    /// flash animator; takes effect on the next render.
    fn swap_colors(&mut self, element: ElementId);

    /// Toggle fullscreen on windowed surfaces. Fixed panels ignore this.
    fn set_fullscreen(&mut self, fullscreen: bool) {
        let _ = fullscreen;
    }

    /// Current drawable height in pixels, for font sizing.
    fn viewport_height(&self) -> u32;

    /// Push the rendered frame to the device.
    fn present(&mut self) -> Result<(), SurfaceError>;
}

/// Item font size in pixels for a given viewport height (never below 12).
pub fn item_font_px(viewport_height: u32) -> u32 {
    (viewport_height / 10).max(12)
}

/// Title font size in pixels for a given viewport height (never below 12).
pub fn title_font_px(viewport_height: u32) -> u32 {
    (viewport_height / 20).max(12)
}

/// Grid cell for an item slot: (row, column) in the 4x2 item grid below the
/// header row. Items run left-to-right, top-to-bottom.
pub fn item_cell(index: usize) -> (u8, u8) {
    ((index / 2) as u8, (index % 2) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_sizing_tracks_viewport() {
        // 720p headset: items 72px, title 36px
        assert_eq!(item_font_px(720), 72);
        assert_eq!(title_font_px(720), 36);
    }

    #[test]
    fn test_font_sizing_floor() {
        // small panels clamp to the 12px minimum
        assert_eq!(item_font_px(64), 12);
        assert_eq!(title_font_px(64), 12);
        assert_eq!(item_font_px(0), 12);
    }

    #[test]
    fn test_item_grid_cells() {
        assert_eq!(item_cell(0), (0, 0));
        assert_eq!(item_cell(1), (0, 1));
        assert_eq!(item_cell(2), (1, 0));
        assert_eq!(item_cell(6), (3, 0));
        assert_eq!(item_cell(7), (3, 1));
    }
}
