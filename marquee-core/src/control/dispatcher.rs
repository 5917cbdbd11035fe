//! Button input dispatcher
//!
//! Polls the three buttons for a pressed level and turns each press into a
//! state transition:
//!
//! - Select: light the backlight if dark, toggle autoplay
//! - Up / Down: disable autoplay, light the backlight if dark, move the
//!   cursor one message forward / back and show it
//!
//! Every handled press is followed by a debounce pause. Detection is by
//! level, not edge: a button still held when the pause ends fires again, so
//! holding Up auto-repeats.

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::{BacklightController, Error, Routine, Step};
use crate::config::PanelConfig;
use crate::state::{Event, SharedState};
use crate::traits::{Button, ButtonInput, DisplayDriver};

/// Button polling routine
pub struct InputDispatcher<'a, M: RawMutex, D, B> {
    shared: &'a SharedState<M, D>,
    backlight: BacklightController<'a, M, D>,
    input: B,
    debounce_ms: u32,
    poll_interval_ms: u32,
    /// Position in `Button::ALL` where the current scan resumes
    next: usize,
}

impl<'a, M: RawMutex, D: DisplayDriver, B: ButtonInput> InputDispatcher<'a, M, D, B> {
    pub fn new(shared: &'a SharedState<M, D>, input: B, config: &PanelConfig) -> Self {
        Self {
            shared,
            backlight: BacklightController::new(shared, config),
            input,
            debounce_ms: config.timing.debounce_ms,
            poll_interval_ms: config.timing.poll_interval_ms,
            next: 0,
        }
    }

    /// Apply the action bound to `button`
    pub fn press(&mut self, button: Button) -> Result<Event, Error> {
        match button.delta() {
            None => {
                self.wake()?;
                let enabled = self.shared.toggle_autoplay();
                Ok(Event::AutoplayToggled { enabled })
            }
            Some(delta) => {
                self.shared.set_autoplay(false);
                self.wake()?;
                let index = self.shared.with_lock(|panel| -> Result<usize, Error> {
                    panel.display().clear()?;
                    let index = panel.step(delta);
                    let text = panel.message();
                    panel.display().write_message(text)?;
                    Ok(index)
                })?;
                Ok(Event::Navigated { button, index })
            }
        }
    }

    /// Light the backlight if it is dark
    fn wake(&self) -> Result<(), Error> {
        if !self.shared.backlight_on() {
            self.backlight.notify_activity()?;
        }
        Ok(())
    }
}

impl<M: RawMutex, D: DisplayDriver, B: ButtonInput> Routine for InputDispatcher<'_, M, D, B> {
    fn step(&mut self) -> Result<Step, Error> {
        while let Some(&button) = Button::ALL.get(self.next) {
            self.next += 1;
            if self.input.is_pressed(button)? {
                let event = self.press(button)?;
                return Ok(Step::with(self.debounce_ms, event));
            }
        }

        self.next = 0;
        Ok(Step::idle(self.poll_interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    use super::*;
    use crate::testing::{Op, RecordingDisplay, Scheduler, ScriptedButtons};
    use crate::traits::InputError;

    fn shared(config: &PanelConfig) -> SharedState<NoopRawMutex, RecordingDisplay> {
        SharedState::new(config, RecordingDisplay::default()).unwrap()
    }

    fn presses(sched: &Scheduler<'_>) -> Vec<(u64, Event)> {
        sched.events.clone()
    }

    #[test]
    fn test_navigation_disables_autoplay_and_select_restores_it() {
        let config = PanelConfig::default();
        let shared = shared(&config);
        let clock = Cell::new(0);
        let mut dispatcher = InputDispatcher::new(&shared, ScriptedButtons::new(&clock), &config);

        assert!(shared.autoplay_enabled());
        dispatcher.press(Button::Up).unwrap();
        assert!(!shared.autoplay_enabled());
        dispatcher.press(Button::Select).unwrap();
        assert!(shared.autoplay_enabled());

        dispatcher.press(Button::Down).unwrap();
        assert!(!shared.autoplay_enabled());
    }

    #[test]
    fn test_up_and_down_wrap() {
        let config = PanelConfig::default();
        let shared = shared(&config);
        let clock = Cell::new(0);
        let mut dispatcher = InputDispatcher::new(&shared, ScriptedButtons::new(&clock), &config);

        assert_eq!(
            dispatcher.press(Button::Down).unwrap(),
            Event::Navigated { button: Button::Down, index: 2 }
        );
        assert_eq!(
            dispatcher.press(Button::Up).unwrap(),
            Event::Navigated { button: Button::Up, index: 0 }
        );
        shared.with_lock(|panel| {
            let ops = &panel.display().ops;
            // backlight, then clear + write for each press
            assert_eq!(ops[0], Op::Backlight(true));
            assert_eq!(ops[1], Op::Clear);
            assert_eq!(ops[2], Op::Write("F3: 7.35A\n    1625W".into()));
            assert_eq!(ops[3], Op::Clear);
            assert_eq!(ops[4], Op::Write("F1: 11.5A\n    2500W".into()));
        });
    }

    #[test]
    fn test_every_button_lights_dark_backlight() {
        for button in Button::ALL {
            let config = PanelConfig::default();
            let shared = shared(&config);
            let clock = Cell::new(0);
            let mut dispatcher =
                InputDispatcher::new(&shared, ScriptedButtons::new(&clock), &config);

            dispatcher.press(button).unwrap();
            assert!(shared.backlight_on(), "{:?} should light the backlight", button);
        }
    }

    #[test]
    fn test_press_while_lit_keeps_timeout() {
        let mut config = PanelConfig::default();
        config.timing.poll_interval_ms = 1000;
        config.backlight.timeout_ticks = 5;
        let shared = shared(&config);
        let clock = Cell::new(0);
        let backlight = BacklightController::new(&shared, &config);
        let mut dispatcher = InputDispatcher::new(&shared, ScriptedButtons::new(&clock), &config);

        assert!(backlight.notify_activity().unwrap());
        for _ in 0..3 {
            assert!(!backlight.tick().unwrap());
        }

        // Already lit: the press does not restart the inactivity count
        dispatcher.press(Button::Up).unwrap();
        assert!(!backlight.tick().unwrap());
        assert!(backlight.tick().unwrap());
        assert!(!shared.backlight_on());
    }

    #[test]
    fn test_select_does_not_touch_display_text() {
        let config = PanelConfig::default();
        let shared = shared(&config);
        let clock = Cell::new(0);
        let mut dispatcher = InputDispatcher::new(&shared, ScriptedButtons::new(&clock), &config);

        dispatcher.press(Button::Select).unwrap();
        shared.with_lock(|panel| {
            assert_eq!(panel.display().ops, [Op::Backlight(true)]);
        });
    }

    #[test]
    fn test_short_press_fires_once() {
        let config = PanelConfig::default();
        let shared = shared(&config);
        let clock = Cell::new(0);
        let buttons = ScriptedButtons::new(&clock).hold(Button::Up, 0, 300);
        let mut dispatcher = InputDispatcher::new(&shared, buttons, &config);

        let mut sched = Scheduler::new(&clock);
        sched.add(&mut dispatcher);
        sched.run_until(5000);

        assert_eq!(
            presses(&sched),
            [(0, Event::Navigated { button: Button::Up, index: 1 })]
        );
    }

    #[test]
    fn test_held_press_repeats_after_debounce() {
        let config = PanelConfig::default();
        let shared = shared(&config);
        let clock = Cell::new(0);
        let buttons = ScriptedButtons::new(&clock).hold(Button::Up, 0, 700);
        let mut dispatcher = InputDispatcher::new(&shared, buttons, &config);

        let mut sched = Scheduler::new(&clock);
        sched.add(&mut dispatcher);
        sched.run_until(5000);

        // 0ms press, 500ms debounce finishes the scan, 600ms still held
        assert_eq!(
            presses(&sched),
            [
                (0, Event::Navigated { button: Button::Up, index: 1 }),
                (600, Event::Navigated { button: Button::Up, index: 2 }),
            ]
        );
    }

    #[test]
    fn test_scan_order_and_resume() {
        let config = PanelConfig::default();
        let shared = shared(&config);
        let clock = Cell::new(0);
        let buttons = ScriptedButtons::new(&clock)
            .hold(Button::Select, 0, 100)
            .hold(Button::Down, 0, 1000);
        let mut dispatcher = InputDispatcher::new(&shared, buttons, &config);

        // Select first, then the scan resumes at Up after the debounce
        assert_eq!(
            dispatcher.step().unwrap(),
            Step::with(500, Event::AutoplayToggled { enabled: false })
        );
        clock.set(500);
        assert_eq!(
            dispatcher.step().unwrap(),
            Step::with(500, Event::Navigated { button: Button::Down, index: 2 })
        );
        clock.set(1000);
        assert_eq!(dispatcher.step().unwrap(), Step::idle(100));
    }

    #[test]
    fn test_read_failure_is_fatal_error() {
        let config = PanelConfig::default();
        let shared = shared(&config);
        let clock = Cell::new(0);
        let mut buttons = ScriptedButtons::new(&clock);
        buttons.broken = Some(Button::Up);
        let mut dispatcher = InputDispatcher::new(&shared, buttons, &config);

        assert_eq!(
            dispatcher.step(),
            Err(Error::Input(InputError::Read(Button::Up)))
        );
    }
}
