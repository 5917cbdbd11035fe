//! Autoplay task
//!
//! Cycles the message set while autoplay is enabled.

use defmt::*;

use marquee_core::config::PanelConfig;
use marquee_core::control::MessageCycler;

use super::{drive, Shared};

#[embassy_executor::task]
pub async fn autoplay_task(shared: &'static Shared, config: &'static PanelConfig) {
    info!("Autoplay task started (dwell={}ms)", config.timing.dwell_ms);

    drive("autoplay", MessageCycler::new(shared, config)).await
}
