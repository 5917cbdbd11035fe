//! Polling routines
//!
//! Each of the three concurrent loops is a [`Routine`]: one call to
//! [`Routine::step`] does one unit of work and says how long the caller
//! should suspend before the next call. The firmware drives each routine from
//! its own embassy task; tests drive them from a virtual clock.

pub mod backlight;
pub mod cycler;
pub mod dispatcher;

pub use backlight::BacklightController;
pub use cycler::MessageCycler;
pub use dispatcher::InputDispatcher;

use crate::state::Event;
use crate::traits::{DisplayError, InputError};

/// Collaborator failure surfaced by a routine
///
/// There is no recoverable error class: callers treat every variant as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A display call failed
    Display(DisplayError),
    /// A button read failed
    Input(InputError),
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Error::Display(e)
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Error::Input(e)
    }
}

/// Outcome of one routine step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    /// How long to suspend before the next step
    pub wait_ms: u32,
    /// What the step did, if anything worth reporting
    pub event: Option<Event>,
}

impl Step {
    /// Nothing happened; poll again after `wait_ms`
    pub const fn idle(wait_ms: u32) -> Self {
        Self {
            wait_ms,
            event: None,
        }
    }

    /// `event` happened; continue after `wait_ms`
    pub const fn with(wait_ms: u32, event: Event) -> Self {
        Self {
            wait_ms,
            event: Some(event),
        }
    }
}

/// One independently scheduled polling loop
pub trait Routine {
    /// Do one unit of work
    ///
    /// Must not block; all waiting is expressed through [`Step::wait_ms`].
    fn step(&mut self) -> Result<Step, Error>;
}
