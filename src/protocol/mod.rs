//! # Erika Protocol Implementation
//!
//! This module provides the byte-level protocol spoken by the Erika 3004
//! typewriter interface.
//!
//! ## Module Structure
//!
//! - [`commands`]: Control bytes and command builders (movement, microsteps, alarm, modes)
//! - [`charset`]: Character table mapping text to key codes
//! - [`escape`]: ANSI CSI decoder for text with embedded cursor commands
//!
//! ## Usage Example
//!
//! ```
//! use erika::protocol::{charset::CharacterCodec, commands::{self, Direction}};
//!
//! let codec = CharacterCodec::bundled()?;
//!
//! let mut data = Vec::new();
//! data.push(codec.encode('H')?);
//! data.push(codec.encode('i')?);
//! data.extend(commands::full_steps(Direction::Down, 2));
//! data.extend(commands::horizontal_microsteps(-15));
//!
//! // Send `data` to the typewriter via a transport...
//! # Ok::<(), erika::error::ErikaError>(())
//! ```

pub mod charset;
pub mod commands;
pub mod escape;

pub use charset::CharacterCodec;
pub use commands::Direction;
