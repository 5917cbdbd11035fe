//! Routine events
//!
//! Reported by each routine step so the firmware can log what happened
//! without the core depending on a logger.

use crate::traits::Button;

/// Something observable a routine step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Autoplay put a message on the display
    ///
    /// `wrapped` is set when the cursor came back around to the first
    /// message, completing a pass.
    Shown { index: usize, wrapped: bool },
    /// Autoplay was switched off in the middle of a pass
    PassAborted { index: usize },
    /// Select toggled autoplay
    AutoplayToggled { enabled: bool },
    /// Up or Down moved the cursor
    Navigated { button: Button, index: usize },
    /// The inactivity timeout switched the backlight off
    BacklightOff,
}
