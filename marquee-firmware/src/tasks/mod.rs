//! Embassy async tasks
//!
//! One task per polling routine. Tasks share the panel state by reference
//! and never hold its lock across an await.

pub mod autoplay;
pub mod backlight;
pub mod buttons;

pub use autoplay::autoplay_task;
pub use backlight::backlight_task;
pub use buttons::buttons_task;

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_time::{Delay, Timer};

use marquee_core::control::Routine;
use marquee_core::state::{Event, SharedState};
use marquee_drivers::{ActiveLowButtons, Hd44780};

/// The panel's LCD
pub type Lcd = Hd44780<Output<'static>, Delay>;

/// Panel state shared by every task
pub type Shared = SharedState<ThreadModeRawMutex, Lcd>;

/// The panel's button bank
pub type Buttons = ActiveLowButtons<Input<'static>>;

/// Step `routine` forever, sleeping between steps as it asks
///
/// A collaborator failure leaves the hardware in an unknown state, so it
/// halts the firmware.
async fn drive(name: &str, mut routine: impl Routine) -> ! {
    loop {
        match routine.step() {
            Ok(step) => {
                if let Some(event) = step.event {
                    log_event(event);
                }
                Timer::after_millis(u64::from(step.wait_ms)).await;
            }
            Err(e) => defmt::panic!("{} task failed: {}", name, e),
        }
    }
}

fn log_event(event: Event) {
    match event {
        Event::Shown { index, wrapped } => {
            if wrapped {
                debug!("Autoplay pass complete");
            }
            debug!("Showing message {}", index);
        }
        Event::PassAborted { index } => info!("Autoplay stopped at message {}", index),
        Event::AutoplayToggled { enabled } => info!("Autoplay enabled={}", enabled),
        Event::Navigated { button, index } => info!("{} pressed, message {}", button, index),
        Event::BacklightOff => info!("Backlight off after inactivity"),
    }
}
