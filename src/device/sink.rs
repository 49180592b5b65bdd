//! Escape sequence sink.
//!
//! Feeds decoded text into a [`Device`]. The device cannot report where
//! its carriage is, so the sink keeps its own cursor relative to the
//! position it started at; this makes absolute positioning (`CHA`, `CUP`)
//! and save/restore work. Row and column 1 are the start position.

use super::Device;
use crate::error::Result;
use crate::protocol::Direction;
use crate::protocol::escape::{self, EscapeSequenceHandler};

#[derive(Debug)]
pub struct EscapeSink<'a, D: Device + ?Sized> {
    device: &'a mut D,
    x: i64,
    y: i64,
    saved: Option<(i64, i64)>,
}

impl<'a, D: Device + ?Sized> EscapeSink<'a, D> {
    pub fn new(device: &'a mut D) -> Self {
        Self {
            device,
            x: 0,
            y: 0,
            saved: None,
        }
    }

    /// Decode `text` and send it to the device.
    ///
    /// ## Errors
    ///
    /// See [`escape::decode`].
    pub fn write(&mut self, text: &str) -> Result<()> {
        escape::decode(text, self)
    }

    /// Cursor relative to the start position, 0-based.
    pub fn position(&self) -> (i64, i64) {
        (self.x, self.y)
    }

    fn move_by(&mut self, dx: i64, dy: i64) -> Result<()> {
        let horizontal = if dx < 0 { Direction::Left } else { Direction::Right };
        let vertical = if dy < 0 { Direction::Up } else { Direction::Down };
        if dx != 0 {
            self.device
                .move_cursor(horizontal, dx.unsigned_abs() as usize)?;
        }
        if dy != 0 {
            self.device.move_cursor(vertical, dy.unsigned_abs() as usize)?;
        }
        self.x += dx;
        self.y += dy;
        Ok(())
    }

    fn move_to(&mut self, x: i64, y: i64) -> Result<()> {
        self.move_by(x - self.x, y - self.y)
    }
}

/// ANSI rows and columns are 1-based; 0 means 1.
fn zero_based(n: u16) -> i64 {
    i64::from(n.max(1)) - 1
}

impl<D: Device + ?Sized> EscapeSequenceHandler for EscapeSink<'_, D> {
    fn print_character(&mut self, ch: char) -> Result<()> {
        match ch {
            '\n' => {
                self.device.crlf()?;
                self.x = 0;
                self.y += 1;
            }
            '\r' => self.move_to(0, self.y)?,
            _ => {
                let mut buffer = [0u8; 4];
                self.device.print_text(ch.encode_utf8(&mut buffer))?;
                self.x += 1;
            }
        }
        Ok(())
    }

    fn cursor_up(&mut self, n: u16) -> Result<()> {
        self.move_by(0, -i64::from(n))
    }

    fn cursor_down(&mut self, n: u16) -> Result<()> {
        self.move_by(0, i64::from(n))
    }

    fn cursor_forward(&mut self, n: u16) -> Result<()> {
        self.move_by(i64::from(n), 0)
    }

    fn cursor_back(&mut self, n: u16) -> Result<()> {
        self.move_by(-i64::from(n), 0)
    }

    fn cursor_next_line(&mut self, n: u16) -> Result<()> {
        self.move_to(0, self.y + i64::from(n))
    }

    fn cursor_previous_line(&mut self, n: u16) -> Result<()> {
        self.move_to(0, self.y - i64::from(n))
    }

    fn cursor_horizontal_absolute(&mut self, column: u16) -> Result<()> {
        self.move_to(zero_based(column), self.y)
    }

    fn cursor_position(&mut self, row: u16, column: u16) -> Result<()> {
        self.move_to(zero_based(column), zero_based(row))
    }

    fn save_cursor_position(&mut self) -> Result<()> {
        self.saved = Some((self.x, self.y));
        Ok(())
    }

    fn restore_cursor_position(&mut self) -> Result<()> {
        match self.saved {
            Some((x, y)) => self.move_to(x, y),
            None => {
                tracing::debug!("restore cursor without saved position, ignoring");
                Ok(())
            }
        }
    }

    fn aux_port(&mut self, on: bool) -> Result<()> {
        tracing::debug!("AUX port {}, keyboard echo follows", if on { "on" } else { "off" });
        self.device.set_keyboard_echo(on)
    }
}
