//! # Erika - Typewriter Printer Library
//!
//! Erika is a Rust library for driving a Robotron Erika 3004 electronic
//! typewriter as a printer over its serial interface. It provides:
//!
//! - **Protocol implementation**: command bytes, character table, ANSI escapes
//! - **Devices**: the real typewriter plus in-memory mocks for testing
//! - **Rendering**: five orders for putting text art and images on paper
//! - **Transport**: serial tty communication
//!
//! ## Quick Start
//!
//! ```no_run
//! use erika::{
//!     device::{Device, Erika, OverprintPolicy},
//!     printer::ErikaConfig,
//!     render::{self, Content, LineSource},
//! };
//!
//! // Open connection to the typewriter
//! let mut erika = Erika::open("/dev/ttyUSB0", ErikaConfig::ERIKA_3004)?;
//!
//! // Type some text
//! erika.print_text("Hello, World!")?;
//! erika.crlf()?;
//!
//! // Render ASCII art from the middle outwards
//! let content = Content::Text(LineSource::from_path("art.txt")?);
//! let mut strategy = render::by_name("ArchimedeanSpiralOutward").unwrap();
//! render::render(&mut erika, &content, strategy.as_mut(), OverprintPolicy::Lenient)?;
//!
//! # Ok::<(), erika::error::ErikaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Command bytes, character table, escape decoder |
//! | [`device`] | Typewriter operations, real device and mocks |
//! | [`render`] | Content sources, surfaces and strategies |
//! | [`transport`] | Communication backends |
//! | [`printer`] | Hardware configuration |
//! | [`error`] | Error types |
//!
//! ## Supported Machines
//!
//! Currently tested with:
//! - Robotron Erika 3004 electronic (1200 baud, 12 characters per inch)
//!
//! Erika 3005/3006 models share the protocol and should work with
//! appropriate configuration adjustments.

pub mod device;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use device::{Device, Erika};
pub use error::{ErikaError, Result};
pub use printer::ErikaConfig;
pub use transport::SerialTransport;
