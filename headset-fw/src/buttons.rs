//! Bonnet pushbuttons.
//!
//! The radio bonnet wires three buttons to GPIO 5, 6 and 12 with pull-ups;
//! a press pulls the line low.

use embassy_rp::gpio::Input;

use headset_core::traits::input::{Button, ButtonInput, InputError};

pub struct BonnetButtons<'d> {
    a: Input<'d>,
    b: Input<'d>,
    c: Input<'d>,
}

impl<'d> BonnetButtons<'d> {
    pub fn new(a: Input<'d>, b: Input<'d>, c: Input<'d>) -> Self {
        Self { a, b, c }
    }
}

impl ButtonInput for BonnetButtons<'_> {
    fn is_pressed(&mut self, button: Button) -> Result<bool, InputError> {
        let pin = match button {
            Button::A => &self.a,
            Button::B => &self.b,
            Button::C => &self.c,
        };
        // active-low: pressed reads low
        Ok(pin.is_low())
    }
}
