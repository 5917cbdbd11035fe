//! Push-button input trait

/// The three logical buttons on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Start/stop autoplay
    Select,
    /// Next message
    Up,
    /// Previous message
    Down,
}

impl Button {
    /// All buttons, in the order the dispatcher scans them
    pub const ALL: [Button; 3] = [Button::Select, Button::Up, Button::Down];

    /// Cursor movement for a navigation button
    pub fn delta(self) -> Option<isize> {
        match self {
            Button::Select => None,
            Button::Up => Some(1),
            Button::Down => Some(-1),
        }
    }
}

/// Errors reading a button line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// The GPIO read for this button failed
    Read(Button),
}

/// Polled button bank
///
/// Implementations translate the electrical convention (usually active-low
/// with a pull-up) into a logical "pressed" level.
pub trait ButtonInput {
    /// Whether `button` is held down right now
    fn is_pressed(&mut self, button: Button) -> Result<bool, InputError>;
}
