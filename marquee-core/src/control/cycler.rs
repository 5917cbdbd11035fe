//! Autoplay message cycler
//!
//! While autoplay is enabled, shows one message per dwell interval and
//! advances through the table, wrapping from the last message to the first.
//! Switching autoplay off aborts the pass at once; switching it back on
//! starts a fresh pass at whatever message is current, without advancing.
//! That holds even when autoplay goes off and on again between two cycler
//! steps: the shared autoplay epoch records the interruption.
//!
//! Autoplay never lights the backlight.

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::{Error, Routine, Step};
use crate::config::PanelConfig;
use crate::state::{Event, SharedState};
use crate::traits::DisplayDriver;

/// Autoplay routine
pub struct MessageCycler<'a, M: RawMutex, D> {
    shared: &'a SharedState<M, D>,
    dwell_ms: u32,
    poll_interval_ms: u32,
    /// A pass is running: the next step advances before showing
    in_pass: bool,
    /// Autoplay epoch the running pass belongs to
    epoch: u32,
}

impl<'a, M: RawMutex, D: DisplayDriver> MessageCycler<'a, M, D> {
    pub fn new(shared: &'a SharedState<M, D>, config: &PanelConfig) -> Self {
        Self {
            shared,
            dwell_ms: config.timing.dwell_ms,
            poll_interval_ms: config.timing.poll_interval_ms,
            in_pass: false,
            epoch: shared.autoplay_epoch(),
        }
    }

    /// Whether a pass is in progress
    pub fn in_pass(&self) -> bool {
        self.in_pass
    }

    fn abort(&mut self) -> Step {
        if !self.in_pass {
            return Step::idle(self.poll_interval_ms);
        }
        self.in_pass = false;
        let index = self.shared.current_index();
        Step::with(self.poll_interval_ms, Event::PassAborted { index })
    }
}

impl<M: RawMutex, D: DisplayDriver> Routine for MessageCycler<'_, M, D> {
    fn step(&mut self) -> Result<Step, Error> {
        if !self.shared.autoplay_enabled() {
            return Ok(self.abort());
        }

        let advance = self.in_pass;
        let epoch = self.epoch;
        let shared = self.shared;
        let shown = shared.with_lock(|panel| -> Result<Option<(usize, bool, u32)>, Error> {
            // A button may have switched autoplay off since the check above;
            // its update must not be followed by a stale advance.
            if !shared.autoplay_enabled() {
                return Ok(None);
            }
            let current = shared.autoplay_epoch();
            let mut wrapped = false;
            if advance && current == epoch {
                wrapped = panel.step(1) == 0;
            }
            panel.show()?;
            Ok(Some((panel.index(), wrapped, current)))
        })?;

        match shown {
            Some((index, wrapped, epoch)) => {
                self.in_pass = true;
                self.epoch = epoch;
                Ok(Step::with(self.dwell_ms, Event::Shown { index, wrapped }))
            }
            None => Ok(self.abort()),
        }
    }
}
