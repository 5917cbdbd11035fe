//! Immutable message table with wrapping cursor arithmetic

use heapless::Vec;

use crate::config::{ConfigError, Message, MAX_MESSAGES};

/// Ordered, non-empty set of display strings
#[derive(Debug, Clone)]
pub struct MessageSet {
    messages: Vec<Message, MAX_MESSAGES>,
}

impl MessageSet {
    /// Build a message set, rejecting an empty table
    pub fn new(messages: Vec<Message, MAX_MESSAGES>) -> Result<Self, ConfigError> {
        if messages.is_empty() {
            return Err(ConfigError::NoMessages);
        }
        Ok(Self { messages })
    }

    /// Number of messages (always at least one)
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Message text at a valid index
    ///
    /// Out-of-range indices are wrapped first, so this never panics.
    pub fn get(&self, index: usize) -> &str {
        self.messages[index % self.len()].as_str()
    }

    /// Normalize any index into `[0, len)`
    ///
    /// Advancing past the end lands on 0, retreating past 0 lands on the last
    /// message.
    pub fn wrap(&self, index: isize) -> usize {
        index.rem_euclid(self.len() as isize) as usize
    }

    /// Iterate over the messages in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.as_str())
    }
}
