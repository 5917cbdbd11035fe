//! Board-agnostic core logic for the status panel firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (character display, button bank)
//! - Configuration types and validation
//! - Shared panel state guarded by a single mutex
//! - The three polling routines: backlight, autoplay, button input

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;
