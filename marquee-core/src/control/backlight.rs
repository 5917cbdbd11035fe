//! Backlight controller
//!
//! Lights the backlight on user activity and switches it off after a period
//! of inactivity. Inactivity is counted in poll intervals, not read from a
//! wall clock: each tick while lit adds one poll interval.

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::{Error, Routine, Step};
use crate::config::PanelConfig;
use crate::state::{Event, SharedState};
use crate::traits::{DisplayDriver, DisplayError};

/// Owns the backlight on/off transitions
///
/// Cheap to copy; the input dispatcher holds its own copy to report
/// activity.
pub struct BacklightController<'a, M: RawMutex, D> {
    shared: &'a SharedState<M, D>,
    poll_interval_ms: u32,
    timeout_ms: u32,
}

impl<M: RawMutex, D> Clone for BacklightController<'_, M, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex, D> Copy for BacklightController<'_, M, D> {}

impl<'a, M: RawMutex, D: DisplayDriver> BacklightController<'a, M, D> {
    /// Create a controller for `shared` using the configured timeout
    pub fn new(shared: &'a SharedState<M, D>, config: &PanelConfig) -> Self {
        Self {
            shared,
            poll_interval_ms: config.timing.poll_interval_ms,
            timeout_ms: config.backlight.timeout_ms(),
        }
    }

    /// Keep the backlight alive
    ///
    /// Lights it if dark, and restarts the inactivity count either way.
    /// Returns true if this call switched the backlight on.
    pub fn notify_activity(&self) -> Result<bool, DisplayError> {
        self.shared.with_lock(|panel| {
            if self.shared.backlight_on() {
                panel.reset_idle();
                Ok(false)
            } else {
                panel.set_backlight(true)?;
                Ok(true)
            }
        })
    }

    /// Account for one poll interval of inactivity
    ///
    /// Returns true if the timeout expired and the backlight was switched
    /// off.
    pub fn tick(&self) -> Result<bool, DisplayError> {
        if !self.shared.backlight_on() {
            return Ok(false);
        }

        self.shared.with_lock(|panel| {
            // Re-check under the lock: the flag may have flipped since
            if !self.shared.backlight_on() {
                return Ok(false);
            }
            if panel.add_idle(self.poll_interval_ms) >= self.timeout_ms {
                panel.set_backlight(false)?;
                return Ok(true);
            }
            Ok(false)
        })
    }
}

impl<M: RawMutex, D: DisplayDriver> Routine for BacklightController<'_, M, D> {
    fn step(&mut self) -> Result<Step, Error> {
        if self.tick()? {
            return Ok(Step::with(self.poll_interval_ms, Event::BacklightOff));
        }
        Ok(Step::idle(self.poll_interval_ms))
    }
}
