//! # Output Devices
//!
//! The [`Device`] trait is the operation set every typewriter backend
//! offers. Rendering and escape decoding are written against it, so the
//! same code drives the real machine or an in-memory stand-in.
//!
//! ## Implementations
//!
//! - [`erika::Erika`]: the real typewriter over any [`Transport`](crate::transport::Transport)
//! - [`mock::CharacterMock`]: character grid recording prints and moves
//! - [`mock::MicrostepMock`]: pixel grid recording microstep graphics
//!
//! [`sink::EscapeSink`] adapts any device into an
//! [`EscapeSequenceHandler`](crate::protocol::escape::EscapeSequenceHandler).

pub mod erika;
pub mod mock;
pub mod sink;

pub use erika::Erika;
pub use mock::{CharacterMock, MicrostepMock, OverprintPolicy};
pub use sink::EscapeSink;

use crate::error::Result;
use crate::protocol::Direction;

/// Number of lines [`Device::demo`] feeds before and after the smiley.
const DEMO_FEED_LINES: usize = 10;

/// Operations supported by a typewriter.
///
/// Positions are never reported by the device: callers that need the
/// cursor position have to track it themselves.
pub trait Device {
    /// Print text at the cursor. Each character advances one cell; `'\n'`
    /// is a line break.
    fn print_text(&mut self, text: &str) -> Result<()>;

    /// Move `steps` whole character cells or lines.
    fn move_cursor(&mut self, direction: Direction, steps: usize) -> Result<()>;

    /// Carriage return plus line feed.
    fn crlf(&mut self) -> Result<()>;

    /// Move a single microstep.
    fn microstep(&mut self, direction: Direction) -> Result<()>;

    /// Move horizontally by `steps` microsteps, positive to the right.
    fn move_horizontal_microsteps(&mut self, steps: i64) -> Result<()>;

    /// Print one dot and leave the cursor one microstep to the right.
    fn print_pixel(&mut self) -> Result<()>;

    /// Sound the beeper.
    fn alarm(&mut self, seconds: f32) -> Result<()>;

    fn set_keyboard_echo(&mut self, enabled: bool) -> Result<()>;

    fn set_correction_mode(&mut self, enabled: bool) -> Result<()>;

    fn set_reverse_print(&mut self, enabled: bool) -> Result<()>;

    /// Block until a key is pressed and return it.
    ///
    /// Keys without a character are reported as their hex code.
    fn read(&mut self) -> Result<String>;

    fn move_up(&mut self) -> Result<()> {
        self.move_cursor(Direction::Up, 1)
    }

    fn move_down(&mut self) -> Result<()> {
        self.move_cursor(Direction::Down, 1)
    }

    fn move_left(&mut self) -> Result<()> {
        self.move_cursor(Direction::Left, 1)
    }

    fn move_right(&mut self) -> Result<()> {
        self.move_cursor(Direction::Right, 1)
    }

    fn move_up_microstep(&mut self) -> Result<()> {
        self.microstep(Direction::Up)
    }

    fn move_down_microstep(&mut self) -> Result<()> {
        self.microstep(Direction::Down)
    }

    fn move_left_microsteps(&mut self, steps: usize) -> Result<()> {
        self.move_horizontal_microsteps(-(steps as i64))
    }

    fn move_right_microsteps(&mut self, steps: usize) -> Result<()> {
        self.move_horizontal_microsteps(steps as i64)
    }

    /// Feed some paper, print a smiley, feed some more.
    fn demo(&mut self) -> Result<()> {
        self.move_cursor(Direction::Down, DEMO_FEED_LINES)?;
        self.print_text(":)")?;
        self.move_cursor(Direction::Down, DEMO_FEED_LINES)
    }
}

impl<D: Device + ?Sized> Device for &mut D {
    fn print_text(&mut self, text: &str) -> Result<()> {
        (**self).print_text(text)
    }

    fn move_cursor(&mut self, direction: Direction, steps: usize) -> Result<()> {
        (**self).move_cursor(direction, steps)
    }

    fn crlf(&mut self) -> Result<()> {
        (**self).crlf()
    }

    fn microstep(&mut self, direction: Direction) -> Result<()> {
        (**self).microstep(direction)
    }

    fn move_horizontal_microsteps(&mut self, steps: i64) -> Result<()> {
        (**self).move_horizontal_microsteps(steps)
    }

    fn print_pixel(&mut self) -> Result<()> {
        (**self).print_pixel()
    }

    fn alarm(&mut self, seconds: f32) -> Result<()> {
        (**self).alarm(seconds)
    }

    fn set_keyboard_echo(&mut self, enabled: bool) -> Result<()> {
        (**self).set_keyboard_echo(enabled)
    }

    fn set_correction_mode(&mut self, enabled: bool) -> Result<()> {
        (**self).set_correction_mode(enabled)
    }

    fn set_reverse_print(&mut self, enabled: bool) -> Result<()> {
        (**self).set_reverse_print(enabled)
    }

    fn read(&mut self) -> Result<String> {
        (**self).read()
    }
}
