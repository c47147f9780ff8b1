//! The OLED-backed page surface.
//!
//! Maps the menu layout onto the 128x64 panel: a header row with the page
//! number and title, then the eight item slots in a 4x2 grid. Flash
//! highlights render as inverted cells - a mono panel's version of swapped
//! foreground/background colors. Unassigned ("<OPEN...>") slots render
//! blank.

use core::fmt::Write as _;

use embedded_graphics::mono_font::ascii::{
    FONT_10X20, FONT_4X6, FONT_5X8, FONT_6X10, FONT_6X12, FONT_7X13, FONT_9X15,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;
use heapless::String;

use headset_core::menu::{ActivePage, MenuPage, MAX_ITEMS};
use headset_core::traits::surface::{
    item_cell, item_font_px, title_font_px, DisplaySurface, ElementId, SurfaceError,
};

use crate::ssd1306::{Ssd1306, HEIGHT, WIDTH};

/// Flashable slots: page number, title, eight items.
const ELEMENT_SLOTS: usize = MAX_ITEMS + 2;

/// Two columns of item cells.
const CELL_W: u32 = WIDTH / 2;
/// Header row height; the four item rows fill the rest.
const HEADER_H: u32 = 13;
const ROW_H: u32 = 12;

/// A [`DisplaySurface`] drawn on the SSD1306.
///
/// Rendering is cheap to call every tick: the frame is rebuilt only when
/// the page or an element's colors changed, and [`DisplaySurface::present`]
/// only touches the bus when the buffer is dirty.
pub struct OledSurface<I2C> {
    display: Ssd1306<I2C>,
    /// Per-element inverted-color flags, toggled by the flash animator.
    inverted: [bool; ELEMENT_SLOTS],
    /// What the frame buffer currently holds.
    rendered: Option<(u16, [bool; ELEMENT_SLOTS])>,
    dirty: bool,
}

impl<I2C> OledSurface<I2C>
where
    I2C: I2c,
{
    pub fn new(display: Ssd1306<I2C>) -> Self {
        Self {
            display,
            inverted: [false; ELEMENT_SLOTS],
            rendered: None,
            dirty: false,
        }
    }
}

impl<I2C> DisplaySurface for OledSurface<I2C>
where
    I2C: I2c,
{
    fn render_page(&mut self, page: &ActivePage) -> Result<(), SurfaceError> {
        let state = (page.number, self.inverted);
        if self.rendered == Some(state) {
            return Ok(());
        }

        self.display.clear_buffer();

        let title_font = font_for_px(title_font_px(HEIGHT));
        let item_font = font_for_px(item_font_px(HEIGHT));

        // header row: page number in the left cell, title in the right
        let mut number: String<8> = String::new();
        let _ = write!(number, "{}", page.number);
        draw_cell(
            &mut self.display,
            &number,
            Point::zero(),
            Size::new(CELL_W, HEADER_H),
            title_font,
            self.inverted[0],
        );
        draw_cell(
            &mut self.display,
            &page.title,
            Point::new(CELL_W as i32, 0),
            Size::new(CELL_W, HEADER_H),
            title_font,
            self.inverted[1],
        );

        for (index, item) in page.items.iter().enumerate() {
            let (row, col) = item_cell(index);
            let origin = Point::new(
                col as i32 * CELL_W as i32,
                (HEADER_H + row as u32 * ROW_H) as i32,
            );
            let size = Size::new(CELL_W, ROW_H);
            let inverted = self.inverted[2 + index];

            if MenuPage::is_placeholder(item) {
                // unassigned slot: blank cell, though a flash still shows
                if inverted {
                    let _ = Rectangle::new(origin, size)
                        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                        .draw(&mut self.display);
                }
                continue;
            }

            draw_cell(&mut self.display, item, origin, size, item_font, inverted);
        }

        self.rendered = Some(state);
        self.dirty = true;
        Ok(())
    }

    fn swap_colors(&mut self, element: ElementId) {
        self.inverted[element_slot(element)] ^= true;
        // next render pass rebuilds the frame
        self.rendered = None;
    }

    fn viewport_height(&self) -> u32 {
        HEIGHT
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        if !self.dirty {
            return Ok(());
        }
        self.display
            .flush()
            .map_err(|_| SurfaceError::Communication)?;
        self.dirty = false;
        Ok(())
    }
}

fn element_slot(element: ElementId) -> usize {
    match element {
        ElementId::PageNumber => 0,
        ElementId::Title => 1,
        ElementId::Item(i) => 2 + (i as usize).min(MAX_ITEMS - 1),
    }
}

/// Largest builtin mono font that fits the requested pixel height.
fn font_for_px(px: u32) -> &'static MonoFont<'static> {
    match px {
        0..=7 => &FONT_4X6,
        8..=9 => &FONT_5X8,
        10..=11 => &FONT_6X10,
        12 => &FONT_6X12,
        13..=14 => &FONT_7X13,
        15..=19 => &FONT_9X15,
        _ => &FONT_10X20,
    }
}

/// Keep the slice on a character boundary while clipping to the cell.
fn fit(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn draw_cell<I2C: I2c>(
    display: &mut Ssd1306<I2C>,
    text: &str,
    origin: Point,
    size: Size,
    font: &'static MonoFont<'static>,
    inverted: bool,
) {
    if inverted {
        let _ = Rectangle::new(origin, size)
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(display);
    }
    let color = if inverted {
        BinaryColor::Off
    } else {
        BinaryColor::On
    };
    let max_chars = (size.width / font.character_size.width) as usize;
    let style = MonoTextStyle::new(font, color);
    let _ = Text::with_baseline(
        fit(text, max_chars),
        origin + Point::new(1, 0),
        style,
        Baseline::Top,
    )
    .draw(display);
}
