//! Hardware driver implementations
//!
//! Concrete implementations of the collaborator traits defined in
//! marquee-core, written against `embedded-hal` 1.0 so they run on any HAL:
//!
//! - HD44780 character LCD on a 4-bit parallel bus
//! - Active-low push-button bank

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buttons;
pub mod hd44780;

pub use buttons::ActiveLowButtons;
pub use hd44780::{Hd44780, LcdPins};
