//! Backlight inactivity task

use defmt::*;

use marquee_core::config::PanelConfig;
use marquee_core::control::BacklightController;

use super::{drive, Shared};

/// Switch the backlight off once the panel has been idle long enough
#[embassy_executor::task]
pub async fn backlight_task(shared: &'static Shared, config: &'static PanelConfig) {
    info!(
        "Backlight task started (timeout={}s)",
        config.backlight.timeout_ticks
    );

    drive("backlight", BacklightController::new(shared, config)).await
}
