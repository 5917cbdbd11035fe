//! Test doubles shared by the unit tests

use core::cell::Cell;

use crate::control::Routine;
use crate::state::Event;
use crate::traits::{Button, ButtonInput, DisplayDriver, DisplayError, InputError};

/// A display operation as seen by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Clear,
    Write(String),
    Backlight(bool),
}

/// Display that records every call
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub ops: Vec<Op>,
    /// Current screen contents
    pub text: String,
    pub backlight: bool,
    /// Fail every call when set
    pub fail: bool,
}

impl RecordingDisplay {
    /// Texts written, in order
    pub fn writes(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DisplayDriver for RecordingDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Pin);
        }
        self.ops.push(Op::Clear);
        self.text.clear();
        Ok(())
    }

    fn write_message(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Pin);
        }
        self.ops.push(Op::Write(text.into()));
        self.text.push_str(text);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Backlight);
        }
        self.ops.push(Op::Backlight(on));
        self.backlight = on;
        Ok(())
    }
}

/// Buttons held over fixed windows of virtual time
pub struct ScriptedButtons<'c> {
    clock: &'c Cell<u64>,
    /// (button, pressed_at_ms, released_at_ms)
    holds: Vec<(Button, u64, u64)>,
    /// Reads of this button fail
    pub broken: Option<Button>,
}

impl<'c> ScriptedButtons<'c> {
    pub fn new(clock: &'c Cell<u64>) -> Self {
        Self {
            clock,
            holds: Vec::new(),
            broken: None,
        }
    }

    /// Hold `button` from `at_ms` for `for_ms`
    pub fn hold(mut self, button: Button, at_ms: u64, for_ms: u64) -> Self {
        self.holds.push((button, at_ms, at_ms + for_ms));
        self
    }
}

impl ButtonInput for ScriptedButtons<'_> {
    fn is_pressed(&mut self, button: Button) -> Result<bool, InputError> {
        if self.broken == Some(button) {
            return Err(InputError::Read(button));
        }
        let now = self.clock.get();
        Ok(self
            .holds
            .iter()
            .any(|&(b, start, end)| b == button && start <= now && now < end))
    }
}

struct Slot<'r> {
    routine: &'r mut dyn Routine,
    due_ms: u64,
}

/// Discrete-event scheduler over a virtual clock
///
/// Runs routines in wake-time order; on a tie the routine added first runs
/// first. Every step's wait is honored exactly, so timing properties can be
/// asserted to the millisecond.
pub struct Scheduler<'r> {
    clock: &'r Cell<u64>,
    slots: Vec<Slot<'r>>,
    pub events: Vec<(u64, Event)>,
}

impl<'r> Scheduler<'r> {
    pub fn new(clock: &'r Cell<u64>) -> Self {
        Self {
            clock,
            slots: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn add(&mut self, routine: &'r mut dyn Routine) {
        let due_ms = self.clock.get();
        self.slots.push(Slot { routine, due_ms });
    }

    /// Run every step due at or before `until_ms`
    pub fn run_until(&mut self, until_ms: u64) {
        loop {
            let Some((i, due_ms)) = self
                .slots
                .iter()
                .enumerate()
                .map(|(i, slot)| (i, slot.due_ms))
                .min_by_key(|&(_, due)| due)
            else {
                return;
            };
            if due_ms > until_ms {
                self.clock.set(until_ms);
                return;
            }

            self.clock.set(due_ms);
            let step = self.slots[i].routine.step().expect("routine failed");
            if let Some(event) = step.event {
                self.events.push((due_ms, event));
            }
            self.slots[i].due_ms = due_ms + u64::from(step.wait_ms);
        }
    }

    /// Events recorded so far, without timestamps
    pub fn event_kinds(&self) -> Vec<Event> {
        self.events.iter().map(|&(_, e)| e).collect()
    }
}
