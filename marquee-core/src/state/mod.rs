//! Shared panel state
//!
//! Everything the three polling routines share: the message table, the
//! cursor and display behind one mutex, and lock-free flags.

pub mod events;
pub mod messages;
pub mod shared;

pub use events::Event;
pub use messages::MessageSet;
pub use shared::{PanelGuard, SharedState};
