//! Configuration type definitions
//!
//! These types describe the panel: display geometry, backlight behavior,
//! loop timing and the message table. All durations are milliseconds.

use heapless::{String, Vec};

/// Maximum number of messages in the table
pub const MAX_MESSAGES: usize = 16;

/// Maximum length of one message in bytes, including line breaks
pub const MAX_MESSAGE_LEN: usize = 80;

/// Largest supported character display
pub const MAX_COLUMNS: u8 = 40;
pub const MAX_ROWS: u8 = 4;

/// Length of one backlight tick
pub const BACKLIGHT_TICK_MS: u32 = 1000;

/// One display message; `\n` separates rows
pub type Message = String<MAX_MESSAGE_LEN>;

/// Stock messages shipped with the default configuration
pub const DEFAULT_MESSAGES: [&str; 3] = [
    "F1: 11.5A\n    2500W",
    "F2: 9.7A\n    1987W",
    "F3: 7.35A\n    1625W",
];

/// Configuration errors, all fatal at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The message table is empty
    NoMessages,
    /// More than `MAX_MESSAGES` messages
    TooManyMessages,
    /// A message exceeds `MAX_MESSAGE_LEN` bytes
    MessageTooLong,
    /// Display columns/rows are zero or larger than supported
    InvalidGeometry,
    /// A message has more lines than rows, or a line wider than the display
    MessageOverflowsDisplay { index: u8 },
    /// Poll interval must be positive
    ZeroPollInterval,
    /// Autoplay dwell must be positive
    ZeroDwell,
    /// Button debounce must be positive
    ZeroDebounce,
    /// Backlight timeout must be at least one tick
    ZeroBacklightTimeout,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NoMessages => f.write_str("message table is empty"),
            ConfigError::TooManyMessages => f.write_str("too many messages"),
            ConfigError::MessageTooLong => f.write_str("message too long"),
            ConfigError::InvalidGeometry => f.write_str("invalid display geometry"),
            ConfigError::MessageOverflowsDisplay { index } => {
                write!(f, "message {} does not fit the display", index)
            }
            ConfigError::ZeroPollInterval => f.write_str("poll interval must be positive"),
            ConfigError::ZeroDwell => f.write_str("dwell must be positive"),
            ConfigError::ZeroDebounce => f.write_str("debounce must be positive"),
            ConfigError::ZeroBacklightTimeout => f.write_str("backlight timeout must be positive"),
        }
    }
}

/// Character display geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Characters per row
    pub columns: u8,
    /// Number of rows
    pub rows: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { columns: 16, rows: 2 }
    }
}

/// Backlight behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BacklightConfig {
    /// Backlight state at power-on
    pub default_on: bool,
    /// Inactivity before the backlight goes dark, in backlight ticks
    pub timeout_ticks: u32,
}

impl BacklightConfig {
    /// Inactivity timeout in milliseconds
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ticks.saturating_mul(BACKLIGHT_TICK_MS)
    }
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self {
            default_on: false,
            timeout_ticks: 300,
        }
    }
}

/// Loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Sleep between polls of every loop
    pub poll_interval_ms: u32,
    /// How long autoplay holds each message
    pub dwell_ms: u32,
    /// Pause after a handled button press
    pub debounce_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            dwell_ms: 3000,
            debounce_ms: 500,
        }
    }
}

/// Autoplay behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoplayConfig {
    /// Autoplay state at power-on
    pub enabled: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Complete panel configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelConfig {
    pub display: DisplayConfig,
    pub backlight: BacklightConfig,
    pub timing: TimingConfig,
    pub autoplay: AutoplayConfig,
    /// Ordered message table
    pub messages: Vec<Message, MAX_MESSAGES>,
}

impl PanelConfig {
    /// Default settings with an empty message table
    pub fn new() -> Self {
        Self {
            display: DisplayConfig::default(),
            backlight: BacklightConfig::default(),
            timing: TimingConfig::default(),
            autoplay: AutoplayConfig::default(),
            messages: Vec::new(),
        }
    }

    /// Append a message to the table
    pub fn push_message(&mut self, text: &str) -> Result<(), ConfigError> {
        let message = Message::try_from(text).map_err(|_| ConfigError::MessageTooLong)?;
        self.messages
            .push(message)
            .map_err(|_| ConfigError::TooManyMessages)
    }

    /// Check every constraint the routines rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let DisplayConfig { columns, rows } = self.display;
        if columns == 0 || rows == 0 || columns > MAX_COLUMNS || rows > MAX_ROWS {
            return Err(ConfigError::InvalidGeometry);
        }

        if self.timing.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.timing.dwell_ms == 0 {
            return Err(ConfigError::ZeroDwell);
        }
        if self.timing.debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        if self.backlight.timeout_ticks == 0 {
            return Err(ConfigError::ZeroBacklightTimeout);
        }

        if self.messages.is_empty() {
            return Err(ConfigError::NoMessages);
        }

        for (index, message) in self.messages.iter().enumerate() {
            if !fits(message, columns, rows) {
                return Err(ConfigError::MessageOverflowsDisplay { index: index as u8 });
            }
        }

        Ok(())
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        let mut config = Self::new();
        for text in DEFAULT_MESSAGES {
            // Stock messages are well under the capacity limits
            let _ = config.push_message(text);
        }
        config
    }
}

/// Whether a message fits a `columns` x `rows` display
fn fits(message: &str, columns: u8, rows: u8) -> bool {
    let mut lines = 0;
    for line in message.split('\n') {
        lines += 1;
        if lines > rows as usize || line.chars().count() > columns as usize {
            return false;
        }
    }
    true
}
