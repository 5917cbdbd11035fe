//! Shared panel state and its mutual-exclusion primitive
//!
//! One mutex guards the display and the cursor index. Every display write
//! and every read-modify-write of the index happens inside
//! [`SharedState::with_lock`]; the lock is taken per operation and never held
//! across a sleep.
//!
//! The autoplay and backlight flags live outside the lock so any task can
//! read them cheaply. A slightly stale read delays a reaction by at most one
//! poll interval.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use super::MessageSet;
use crate::config::{ConfigError, PanelConfig};
use crate::traits::{DisplayDriver, DisplayError, DisplayExt};

/// State that only exists inside the critical section
struct Panel<D> {
    display: D,
    index: usize,
    /// Inactivity accumulated while the backlight is on
    idle_ms: u32,
}

/// Process-wide panel state shared by the polling routines
///
/// `M` selects the raw mutex: `ThreadModeRawMutex` on a single-core
/// executor, `CriticalSectionRawMutex` when tasks may run on other threads
/// or cores.
pub struct SharedState<M: RawMutex, D> {
    messages: MessageSet,
    panel: Mutex<M, RefCell<Panel<D>>>,
    autoplay: AtomicBool,
    /// Bumped every time autoplay is switched off
    autoplay_epoch: AtomicU32,
    /// Mirrors the backlight line; written only under the lock
    backlight_on: AtomicBool,
    backlight_default_on: bool,
}

impl<M: RawMutex, D: DisplayDriver> SharedState<M, D> {
    /// Create the shared state from a validated configuration
    ///
    /// The cursor starts at message 0 and autoplay at its configured default.
    /// Hardware is not touched until [`start`](Self::start).
    pub fn new(config: &PanelConfig, display: D) -> Result<Self, ConfigError> {
        config.validate()?;
        let messages = MessageSet::new(config.messages.clone())?;

        Ok(Self {
            messages,
            panel: Mutex::new(RefCell::new(Panel {
                display,
                index: 0,
                idle_ms: 0,
            })),
            autoplay: AtomicBool::new(config.autoplay.enabled),
            autoplay_epoch: AtomicU32::new(0),
            backlight_on: AtomicBool::new(false),
            backlight_default_on: config.backlight.default_on,
        })
    }

    /// Push the power-on state to the hardware
    ///
    /// Clears the screen and drives the backlight to its configured default.
    pub fn start(&self) -> Result<(), DisplayError> {
        let on = self.backlight_default_on;
        self.with_lock(|panel| {
            panel.display().clear()?;
            panel.set_backlight(on)
        })
    }

    /// Run `f` as a single critical section
    ///
    /// The lock is released on every exit path, including unwinding.
    /// Calling `with_lock` again from inside `f` is a bug and panics.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut PanelGuard<'_, D>) -> R) -> R {
        self.panel.lock(|cell| {
            let mut panel = cell.borrow_mut();
            let mut guard = PanelGuard {
                panel: &mut panel,
                messages: &self.messages,
                backlight_on: &self.backlight_on,
            };
            f(&mut guard)
        })
    }

    /// Normalize `index` into the message range and make it current
    pub fn set_index(&self, index: isize) -> usize {
        self.with_lock(|panel| panel.set_index(index))
    }

    /// Current cursor position
    pub fn current_index(&self) -> usize {
        self.with_lock(|panel| panel.index())
    }
}

impl<M: RawMutex, D> SharedState<M, D> {
    /// The immutable message table
    pub fn messages(&self) -> &MessageSet {
        &self.messages
    }

    /// Whether autoplay is enabled (lock-free)
    pub fn autoplay_enabled(&self) -> bool {
        self.autoplay.load(Ordering::Acquire)
    }

    /// Enable or disable autoplay
    ///
    /// Disabling always ends the running pass, even if autoplay is
    /// re-enabled before the cycler next looks at the flag.
    pub fn set_autoplay(&self, enabled: bool) {
        if !enabled {
            self.autoplay_epoch.fetch_add(1, Ordering::AcqRel);
        }
        self.autoplay.store(enabled, Ordering::Release);
    }

    /// Flip autoplay and return the new state
    pub fn toggle_autoplay(&self) -> bool {
        // Either direction ends the running pass
        self.autoplay_epoch.fetch_add(1, Ordering::AcqRel);
        !self.autoplay.fetch_xor(true, Ordering::AcqRel)
    }

    /// Number of times autoplay has been switched off
    ///
    /// A pass started under one epoch must not continue under another.
    pub fn autoplay_epoch(&self) -> u32 {
        self.autoplay_epoch.load(Ordering::Acquire)
    }

    /// Whether the backlight is lit (lock-free)
    pub fn backlight_on(&self) -> bool {
        self.backlight_on.load(Ordering::Acquire)
    }
}

/// Access to the panel inside a critical section
pub struct PanelGuard<'a, D> {
    panel: &'a mut Panel<D>,
    messages: &'a MessageSet,
    backlight_on: &'a AtomicBool,
}

impl<'a, D: DisplayDriver> PanelGuard<'a, D> {
    /// Current cursor position
    pub fn index(&self) -> usize {
        self.panel.index
    }

    /// Normalize `index` into the message range and make it current
    pub fn set_index(&mut self, index: isize) -> usize {
        self.panel.index = self.messages.wrap(index);
        self.panel.index
    }

    /// Move the cursor by `delta`, wrapping at both ends
    pub fn step(&mut self, delta: isize) -> usize {
        self.set_index(self.panel.index as isize + delta)
    }

    /// Text of the current message
    pub fn message(&self) -> &'a str {
        self.messages.get(self.panel.index)
    }

    /// Replace the screen with the current message
    pub fn show(&mut self) -> Result<(), DisplayError> {
        let text = self.message();
        self.panel.display.show(text)
    }

    /// Direct access to the display driver
    pub fn display(&mut self) -> &mut D {
        &mut self.panel.display
    }

    /// Drive the backlight line and restart the inactivity count
    pub(crate) fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.panel.display.set_backlight(on)?;
        self.backlight_on.store(on, Ordering::Release);
        self.panel.idle_ms = 0;
        Ok(())
    }

    /// Restart the inactivity count without touching the line
    pub(crate) fn reset_idle(&mut self) {
        self.panel.idle_ms = 0;
    }

    /// Add `delta_ms` of inactivity and return the total
    pub(crate) fn add_idle(&mut self, delta_ms: u32) -> u32 {
        self.panel.idle_ms = self.panel.idle_ms.saturating_add(delta_ms);
        self.panel.idle_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Op, RecordingDisplay};
    use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};

    fn shared() -> SharedState<NoopRawMutex, RecordingDisplay> {
        SharedState::new(&PanelConfig::default(), RecordingDisplay::default()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let state = shared();
        assert_eq!(state.current_index(), 0);
        assert!(state.autoplay_enabled());
        assert!(!state.backlight_on());
        assert_eq!(state.messages().len(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result: Result<SharedState<NoopRawMutex, _>, _> =
            SharedState::new(&PanelConfig::new(), RecordingDisplay::default());
        assert_eq!(result.err(), Some(ConfigError::NoMessages));
    }

    #[test]
    fn test_set_index_wraps() {
        let state = shared();
        assert_eq!(state.set_index(3), 0);
        assert_eq!(state.set_index(-1), 2);
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn test_start_applies_backlight_default() {
        let mut config = PanelConfig::default();
        config.backlight.default_on = true;
        let state: SharedState<NoopRawMutex, _> =
            SharedState::new(&config, RecordingDisplay::default()).unwrap();

        state.start().unwrap();

        assert!(state.backlight_on());
        state.with_lock(|panel| {
            assert_eq!(panel.display().ops, [Op::Clear, Op::Backlight(true)]);
        });
    }

    #[test]
    fn test_show_writes_current_message() {
        let state = shared();
        state.with_lock(|panel| {
            panel.step(1);
            panel.show().unwrap();
            assert_eq!(panel.display().text, "F2: 9.7A\n    1987W");
        });
    }

    #[test]
    fn test_toggle_autoplay() {
        let state = shared();
        assert!(!state.toggle_autoplay());
        assert!(state.toggle_autoplay());
        state.set_autoplay(false);
        assert!(!state.autoplay_enabled());
    }

    #[test]
    fn test_disabling_autoplay_bumps_epoch() {
        let state = shared();
        let start = state.autoplay_epoch();

        state.set_autoplay(true);
        assert_eq!(state.autoplay_epoch(), start);

        // Off and straight back on still leaves a trace
        state.set_autoplay(false);
        state.set_autoplay(true);
        assert_eq!(state.autoplay_epoch(), start + 1);

        state.toggle_autoplay();
        state.toggle_autoplay();
        assert_eq!(state.autoplay_epoch(), start + 3);
        assert!(state.autoplay_enabled());
    }

    #[test]
    fn test_display_error_propagates_out_of_lock() {
        let state = shared();
        state.with_lock(|panel| panel.display().fail = true);
        assert_eq!(
            state.with_lock(|panel| panel.show()),
            Err(DisplayError::Pin)
        );
        // The lock was released: the next critical section still runs
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn test_concurrent_updates_never_tear() {
        let state: SharedState<CriticalSectionRawMutex, RecordingDisplay> =
            SharedState::new(&PanelConfig::default(), RecordingDisplay::default()).unwrap();

        std::thread::scope(|s| {
            for delta in [1isize, -1, 1, -1] {
                let state = &state;
                s.spawn(move || {
                    for _ in 0..500 {
                        state.with_lock(|panel| {
                            panel.display().clear().unwrap();
                            panel.step(delta);
                            let text = panel.message();
                            panel.display().write_message(text).unwrap();
                        });
                    }
                });
            }
        });

        state.with_lock(|panel| {
            let expected = panel.message();
            let display = panel.display();
            assert_eq!(display.text, expected);

            // Every clear is immediately followed by its own write
            assert_eq!(display.ops.len(), 4 * 500 * 2);
            for pair in display.ops.chunks(2) {
                assert_eq!(pair[0], Op::Clear);
                assert!(matches!(pair[1], Op::Write(_)));
            }
        });
        // Two threads went up 500, two went down 500
        assert_eq!(state.current_index(), 0);
    }
}
