//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod display;
pub mod input;

pub use display::{DisplayDriver, DisplayError, DisplayExt};
pub use input::{Button, ButtonInput, InputError};
