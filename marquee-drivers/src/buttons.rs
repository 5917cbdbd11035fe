//! Active-low push buttons
//!
//! Each button shorts its GPIO to ground against a pull-up, so a pressed
//! button reads low.

use embedded_hal::digital::InputPin;
use marquee_core::traits::{Button, ButtonInput, InputError};

/// Three-button bank wired active-low
pub struct ActiveLowButtons<P> {
    select: P,
    up: P,
    down: P,
}

impl<P: InputPin> ActiveLowButtons<P> {
    pub fn new(select: P, up: P, down: P) -> Self {
        Self { select, up, down }
    }
}

impl<P: InputPin> ButtonInput for ActiveLowButtons<P> {
    fn is_pressed(&mut self, button: Button) -> Result<bool, InputError> {
        let pin = match button {
            Button::Select => &mut self.select,
            Button::Up => &mut self.up,
            Button::Down => &mut self.down,
        };
        pin.is_low().map_err(|_| InputError::Read(button))
    }
}
