//! Button polling task

use defmt::*;

use marquee_core::config::PanelConfig;
use marquee_core::control::InputDispatcher;

use super::{drive, Buttons, Shared};

/// Poll the buttons and apply presses to the panel
#[embassy_executor::task]
pub async fn buttons_task(
    shared: &'static Shared,
    buttons: Buttons,
    config: &'static PanelConfig,
) {
    info!(
        "Buttons task started (poll={}ms, debounce={}ms)",
        config.timing.poll_interval_ms, config.timing.debounce_ms
    );

    drive("buttons", InputDispatcher::new(shared, buttons, config)).await
}
