//! Marquee - Character Display Status Panel Firmware
//!
//! Main firmware binary for RP2040-based status panels: one HD44780
//! character LCD, three push buttons, and a rotating set of messages
//! compiled in from `panel.toml`.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use marquee_core::config::{parse_config, PanelConfig};
use marquee_core::state::SharedState;
use marquee_drivers::{ActiveLowButtons, Hd44780, LcdPins};

use crate::tasks::Shared;

/// Embedded configuration (compiled into firmware)
/// Edit panel.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../panel.toml");

/// Set when the backlight switch is active-low (PNP transistor)
const BACKLIGHT_INVERTED: bool = false;

mod tasks;

// Static cells for state shared by the tasks (must live forever)
static PANEL_CONFIG: StaticCell<PanelConfig> = StaticCell::new();
static SHARED: StaticCell<Shared> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Marquee firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Any configuration problem is fatal before a task starts
    let config: &'static PanelConfig = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => PANEL_CONFIG.init(config),
        Err(e) => defmt::panic!("Failed to parse panel.toml: {}", e),
    };
    info!(
        "Configuration loaded: {} messages, {}x{} display, autoplay={}",
        config.messages.len(),
        config.display.columns,
        config.display.rows,
        config.autoplay.enabled
    );

    // LCD: RS=GP2, EN=GP3, D4-D7=GP4-GP7, backlight=GP8
    let pins = LcdPins {
        rs: Output::new(p.PIN_2, Level::Low),
        en: Output::new(p.PIN_3, Level::Low),
        d4: Output::new(p.PIN_4, Level::Low),
        d5: Output::new(p.PIN_5, Level::Low),
        d6: Output::new(p.PIN_6, Level::Low),
        d7: Output::new(p.PIN_7, Level::Low),
        backlight: Output::new(p.PIN_8, Level::from(BACKLIGHT_INVERTED)),
        backlight_inverted: BACKLIGHT_INVERTED,
    };
    let mut lcd = Hd44780::new(pins, Delay, &config.display);
    if let Err(e) = lcd.init() {
        defmt::panic!("LCD init failed: {}", e);
    }
    info!("LCD initialized");

    let shared: &'static Shared = match SharedState::new(config, lcd) {
        Ok(shared) => SHARED.init(shared),
        Err(e) => defmt::panic!("Invalid configuration: {}", e),
    };
    if let Err(e) = shared.start() {
        defmt::panic!("Display start failed: {}", e);
    }

    // Buttons: Select=GP10, Up=GP11, Down=GP12, to ground with pull-ups
    let buttons = ActiveLowButtons::new(
        Input::new(p.PIN_10, Pull::Up),
        Input::new(p.PIN_11, Pull::Up),
        Input::new(p.PIN_12, Pull::Up),
    );

    spawner
        .spawn(tasks::buttons_task(shared, buttons, config))
        .unwrap();
    spawner.spawn(tasks::autoplay_task(shared, config)).unwrap();
    spawner.spawn(tasks::backlight_task(shared, config)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
