//! # Erika Typewriter
//!
//! The real machine: every [`Device`] operation becomes command bytes
//! written to a [`Transport`].
//!
//! ## Session Lifetime
//!
//! The transport is owned by the [`Erika`] value. Dropping it (at the end
//! of a scope, on `?` early return, or during unwinding) closes the link.
//!
//! ```no_run
//! use erika::device::{Device, Erika};
//! use erika::printer::ErikaConfig;
//!
//! let mut erika = Erika::open("/dev/ttyUSB0", ErikaConfig::ERIKA_3004)?;
//! erika.crlf()?;
//! erika.print_text("Hello, World!")?;
//! erika.crlf()?;
//! # Ok::<(), erika::error::ErikaError>(())
//! ```

use std::path::Path;

use super::Device;
use crate::error::Result;
use crate::printer::ErikaConfig;
use crate::protocol::charset::CharacterCodec;
use crate::protocol::commands::{self, Direction};
use crate::transport::{SerialTransport, Transport};

/// Character struck by [`Device::print_pixel`].
pub const PIXEL_CHAR: char = '.';

#[derive(Debug)]
pub struct Erika<T: Transport> {
    transport: T,
    codec: CharacterCodec,
    config: ErikaConfig,
}

impl Erika<SerialTransport> {
    /// Open a serial session using the bundled character table.
    ///
    /// ## Errors
    ///
    /// Fails if the device cannot be opened or configured.
    pub fn open<P: AsRef<Path>>(device: P, config: ErikaConfig) -> Result<Self> {
        let transport = SerialTransport::open(device, &config)?;
        Ok(Self::new(transport, CharacterCodec::bundled()?, config))
    }
}

impl<T: Transport> Erika<T> {
    pub fn new(transport: T, codec: CharacterCodec, config: ErikaConfig) -> Self {
        Self {
            transport,
            codec,
            config,
        }
    }

    pub fn codec(&self) -> &CharacterCodec {
        &self.codec
    }

    pub fn config(&self) -> &ErikaConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give back the transport, ending the session.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        tracing::debug!("send {:02X?}", data);
        self.transport.write_all(data)
    }
}

impl<T: Transport> Device for Erika<T> {
    fn print_text(&mut self, text: &str) -> Result<()> {
        for ch in text.chars() {
            let code = self.codec.encode(ch)?;
            self.send(&[code])?;
        }
        Ok(())
    }

    fn move_cursor(&mut self, direction: Direction, steps: usize) -> Result<()> {
        self.send(&commands::full_steps(direction, steps))
    }

    fn crlf(&mut self) -> Result<()> {
        self.send(&commands::line_break())
    }

    fn microstep(&mut self, direction: Direction) -> Result<()> {
        self.send(&commands::microstep(direction))
    }

    fn move_horizontal_microsteps(&mut self, steps: i64) -> Result<()> {
        self.send(&commands::horizontal_microsteps(steps))
    }

    /// Strikes [`PIXEL_CHAR`], which advances a whole character width, then
    /// backs up so the net advance is a single microstep.
    fn print_pixel(&mut self) -> Result<()> {
        let code = self.codec.encode(PIXEL_CHAR)?;
        self.send(&[code])?;
        let back = i64::from(self.config.char_width_microsteps) - 1;
        self.move_horizontal_microsteps(-back)
    }

    fn alarm(&mut self, seconds: f32) -> Result<()> {
        let data = commands::alarm(seconds)?;
        self.send(&data)
    }

    fn set_keyboard_echo(&mut self, enabled: bool) -> Result<()> {
        self.send(&commands::echo(enabled))
    }

    fn set_correction_mode(&mut self, enabled: bool) -> Result<()> {
        self.send(&commands::correction_mode(enabled))
    }

    fn set_reverse_print(&mut self, enabled: bool) -> Result<()> {
        self.send(&commands::reverse_print(enabled))
    }

    fn read(&mut self) -> Result<String> {
        let code = self.transport.read_byte()?;
        Ok(self.codec.decode_lossy(code))
    }
}
