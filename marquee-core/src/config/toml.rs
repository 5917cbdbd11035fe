//! Minimal TOML parser for the panel configuration
//!
//! Handles only the subset `panel.toml` uses, without allocating. It does
//! NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (integer, boolean, string arrays)
//! - `[display]`, `[backlight]`, `[timing]`, `[autoplay]` sections
//! - `[message.<name>]` sections, one per message, in file order
//! - Comments (# ...)
//!
//! NOT supported:
//! - Arrays spanning several lines
//! - Escapes other than `\"` and `\\`
//! - Inline tables and dotted keys

use heapless::String as HString;

use super::{ConfigError, Message, PanelConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Invalid value type
    InvalidValue,
    /// Too many messages
    TooManyItems,
    /// Message text exceeds its capacity
    ValueTooLong,
    /// A `[message.*]` section has no `lines` key
    MissingLines,
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::TooManyMessages => ParseError::TooManyItems,
            ConfigError::MessageTooLong => ParseError::ValueTooLong,
            _ => ParseError::InvalidValue,
        }
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Backlight,
    Timing,
    Autoplay,
    Message,
}

/// Parse TOML configuration into a `PanelConfig`
///
/// Settings absent from the input keep their defaults. The result is not
/// validated; that happens when the shared state is built from it.
pub fn parse_config(input: &str) -> Result<PanelConfig, ParseError> {
    let mut config = PanelConfig::new();
    let mut section = Section::Root;
    // The `[message.*]` section being read
    let mut current_message: Option<MessageSection> = None;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Check for section header
        if line.starts_with('[') && line.ends_with(']') {
            save_message(&mut config, &mut current_message)?;
            section = parse_section_header(&line[1..line.len() - 1])?;
            if section == Section::Message {
                current_message = Some(MessageSection::default());
            }
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        match section {
            Section::Message => {
                let message = current_message.as_mut().ok_or(ParseError::InvalidSection)?;
                match key {
                    "lines" => {
                        parse_lines(value, &mut message.text)?;
                        message.has_lines = true;
                    }
                    _ => return Err(ParseError::UnknownKey),
                }
            }
            _ => apply_value(section, key, value, &mut config)?,
        }
    }

    save_message(&mut config, &mut current_message)?;

    Ok(config)
}

/// Parse a section header like "timing" or "message.f1"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();

    if let Some(name) = header.strip_prefix("message.") {
        if name.is_empty() {
            return Err(ParseError::InvalidSection);
        }
        return Ok(Section::Message);
    }

    match header {
        "display" => Ok(Section::Display),
        "backlight" => Ok(Section::Backlight),
        "timing" => Ok(Section::Timing),
        "autoplay" => Ok(Section::Autoplay),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Message text collected from one `[message.*]` section
#[derive(Default)]
struct MessageSection {
    text: Message,
    has_lines: bool,
}

fn save_message(
    config: &mut PanelConfig,
    current: &mut Option<MessageSection>,
) -> Result<(), ParseError> {
    match current.take() {
        Some(message) if !message.has_lines => Err(ParseError::MissingLines),
        Some(message) => Ok(config.push_message(&message.text)?),
        None => Ok(()),
    }
}

/// Parse a key = value line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments, ignoring '#' inside strings
    let mut in_string = false;
    let mut escaped = false;
    let mut end = value.len();
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    let value = value[..end].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse `["row 1", "row 2"]` into `message`, one `\n` between rows
fn parse_lines(value: &str, message: &mut Message) -> Result<(), ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    message.clear();
    let mut chars = inner.chars().peekable();
    let mut first = true;

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some('"') => {}
            Some(_) => return Err(ParseError::InvalidValue),
        }

        if !first {
            push(message, '\n')?;
        }
        first = false;

        // Quoted row
        loop {
            match chars.next() {
                None => return Err(ParseError::InvalidValue),
                Some('"') => break,
                Some('\\') => match chars.next() {
                    Some(c @ ('"' | '\\')) => push(message, c)?,
                    _ => return Err(ParseError::InvalidValue),
                },
                Some(c) => push(message, c)?,
            }
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => {}
            Some(_) => return Err(ParseError::InvalidValue),
        }
    }

    Ok(())
}

fn push<const N: usize>(s: &mut HString<N>, c: char) -> Result<(), ParseError> {
    s.push(c).map_err(|_| ParseError::ValueTooLong)
}

/// Apply a key/value pair in one of the settings sections
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut PanelConfig,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Display, "columns") => config.display.columns = parse_int(value)?,
        (Section::Display, "rows") => config.display.rows = parse_int(value)?,

        (Section::Backlight, "default_on") => config.backlight.default_on = parse_bool(value)?,
        (Section::Backlight, "timeout_ticks") => {
            config.backlight.timeout_ticks = parse_int(value)?
        }

        (Section::Timing, "poll_interval_ms") => {
            config.timing.poll_interval_ms = parse_int(value)?
        }
        (Section::Timing, "dwell_ms") => config.timing.dwell_ms = parse_int(value)?,
        (Section::Timing, "debounce_ms") => config.timing.debounce_ms = parse_int(value)?,

        (Section::Autoplay, "enabled") => config.autoplay.enabled = parse_bool(value)?,

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}
