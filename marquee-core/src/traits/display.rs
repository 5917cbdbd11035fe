//! Character display driver trait

/// Errors that can occur while driving the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// A data or control line could not be driven
    Pin,
    /// The backlight line could not be driven
    Backlight,
}

/// Trait for a character display
///
/// Calls are synchronous and side-effecting. Callers must hold the panel
/// lock for every call so a clear and its following write never interleave
/// with another task's update.
pub trait DisplayDriver {
    /// Blank the screen and return the cursor home
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Write text starting at the home position
    ///
    /// `\n` moves to the start of the next row.
    fn write_message(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Drive the backlight line
    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError>;
}

/// Helper trait for common display sequences
pub trait DisplayExt: DisplayDriver {
    /// Replace the screen contents with `text`
    fn show(&mut self, text: &str) -> Result<(), DisplayError> {
        self.clear()?;
        self.write_message(text)
    }
}

// Blanket implementation for all DisplayDriver types
impl<T: DisplayDriver> DisplayExt for T {}
