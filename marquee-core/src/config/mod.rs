//! Configuration types
//!
//! Board-agnostic configuration loaded once at startup and immutable
//! afterwards. The firmware embeds it as TOML and parses it with
//! [`parse_config`].

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
