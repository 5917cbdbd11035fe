//! HD44780 character LCD
//!
//! Drives the controller over the 4-bit parallel bus (RS, EN, D4-D7) in
//! write-only mode; the R/W line is expected to be tied low, so busy polling
//! is replaced by worst-case execution delays. A separate GPIO switches the
//! backlight.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use marquee_core::config::{DisplayConfig, MAX_COLUMNS, MAX_ROWS};
use marquee_core::traits::{DisplayDriver, DisplayError};

/// DDRAM address of the first cell of each row
const ROW_OFFSETS: [u8; MAX_ROWS as usize] = [0x00, 0x40, 0x14, 0x54];

// Instructions
const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x04;
const CMD_DISPLAY_CONTROL: u8 = 0x08;
const CMD_FUNCTION_SET: u8 = 0x20;
const CMD_SET_DDRAM: u8 = 0x80;

// Instruction flags
const ENTRY_INCREMENT: u8 = 0x02;
const DISPLAY_ON: u8 = 0x04;
const FUNCTION_TWO_LINES: u8 = 0x08;

/// Execution time of most instructions (datasheet: 37us)
const EXEC_US: u32 = 50;
/// Execution time of clear and return-home (datasheet: 1.52ms)
const CLEAR_US: u32 = 2_000;

/// Character written in place of anything outside printable ASCII
const REPLACEMENT: u8 = b'?';

/// GPIO lines wired to the module
pub struct LcdPins<P> {
    pub rs: P,
    pub en: P,
    pub d4: P,
    pub d5: P,
    pub d6: P,
    pub d7: P,
    pub backlight: P,
    /// Backlight is lit when the line is low (PNP / P-MOSFET switch)
    pub backlight_inverted: bool,
}

/// HD44780 driver
pub struct Hd44780<P, D> {
    pins: LcdPins<P>,
    delay: D,
    columns: u8,
    rows: u8,
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// Create a driver for a `geometry.columns` x `geometry.rows` module
    ///
    /// Geometry beyond 40x4 is clamped. Call [`init`](Self::init) before use.
    pub fn new(pins: LcdPins<P>, delay: D, geometry: &DisplayConfig) -> Self {
        Self {
            pins,
            delay,
            columns: geometry.columns.min(MAX_COLUMNS),
            rows: geometry.rows.min(MAX_ROWS),
        }
    }

    /// Run the power-on initialization sequence
    ///
    /// Forces the controller into 4-bit mode from any prior state, then
    /// turns the display on with the cursor hidden and clears it. The
    /// backlight is left off.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.set_backlight(false)?;
        self.pin(Line::Rs, false)?;
        self.pin(Line::En, false)?;

        // Wait for Vcc to settle
        self.delay.delay_ms(50);

        // Three 8-bit function sets resynchronize the nibble phase
        self.write_nibble(0x3)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x3)?;
        self.delay.delay_us(150);
        self.write_nibble(0x3)?;
        self.delay.delay_us(150);

        // Switch to 4-bit
        self.write_nibble(0x2)?;
        self.delay.delay_us(EXEC_US);

        let lines = if self.rows > 1 { FUNCTION_TWO_LINES } else { 0 };
        self.command(CMD_FUNCTION_SET | lines)?;
        self.command(CMD_DISPLAY_CONTROL | DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE | ENTRY_INCREMENT)
    }

    /// Configured geometry as (columns, rows)
    pub fn geometry(&self) -> (u8, u8) {
        (self.columns, self.rows)
    }

    /// Release the pins and delay
    pub fn release(self) -> (LcdPins<P>, D) {
        (self.pins, self.delay)
    }

    fn set_cursor(&mut self, row: u8) -> Result<(), DisplayError> {
        self.command(CMD_SET_DDRAM | ROW_OFFSETS[row as usize])
    }

    fn command(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send(byte, false)
    }

    fn send(&mut self, byte: u8, data: bool) -> Result<(), DisplayError> {
        self.pin(Line::Rs, data)?;
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)?;
        self.delay.delay_us(EXEC_US);
        Ok(())
    }

    /// Put `nibble` on D4-D7 and latch it on the falling edge of EN
    fn write_nibble(&mut self, nibble: u8) -> Result<(), DisplayError> {
        self.pin(Line::D4, nibble & 0x1 != 0)?;
        self.pin(Line::D5, nibble & 0x2 != 0)?;
        self.pin(Line::D6, nibble & 0x4 != 0)?;
        self.pin(Line::D7, nibble & 0x8 != 0)?;

        self.pin(Line::En, true)?;
        self.delay.delay_us(1);
        self.pin(Line::En, false)?;
        self.delay.delay_us(1);
        Ok(())
    }

    fn pin(&mut self, line: Line, high: bool) -> Result<(), DisplayError> {
        let pin = match line {
            Line::Rs => &mut self.pins.rs,
            Line::En => &mut self.pins.en,
            Line::D4 => &mut self.pins.d4,
            Line::D5 => &mut self.pins.d5,
            Line::D6 => &mut self.pins.d6,
            Line::D7 => &mut self.pins.d7,
        };
        pin.set_state(PinState::from(high))
            .map_err(|_| DisplayError::Pin)
    }
}

#[derive(Clone, Copy)]
enum Line {
    Rs,
    En,
    D4,
    D5,
    D6,
    D7,
}

/// Map a character onto the controller's ROM (A00 matches ASCII 0x20-0x7D)
fn glyph(c: char) -> u8 {
    match c {
        ' '..='}' => c as u8,
        _ => REPLACEMENT,
    }
}

impl<P: OutputPin, D: DelayNs> DisplayDriver for Hd44780<P, D> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_us(CLEAR_US);
        Ok(())
    }

    /// Write `text` from the top-left corner
    ///
    /// `\n` starts the next row. Characters past the last column and rows
    /// past the last row are dropped.
    fn write_message(&mut self, text: &str) -> Result<(), DisplayError> {
        for (row, line) in text.split('\n').take(self.rows as usize).enumerate() {
            self.set_cursor(row as u8)?;
            for c in line.chars().take(self.columns as usize) {
                self.send(glyph(c), true)?;
            }
        }
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        let level = on != self.pins.backlight_inverted;
        self.pins
            .backlight
            .set_state(PinState::from(level))
            .map_err(|_| DisplayError::Backlight)
    }
}
