//! # Device Transport Layer
//!
//! This module provides byte-oriented links to the typewriter.
//!
//! ## Available Transports
//!
//! - [`serial`]: Serial tty at 1200 baud, optional RTS/CTS flow control (Unix)
//! - [`memory`]: In-memory transport that records writes, for tests

pub mod memory;
pub mod serial;

pub use memory::MemoryTransport;
pub use serial::SerialTransport;

use crate::error::Result;

/// A byte-oriented, blocking link to the device.
pub trait Transport {
    /// Write all bytes to the link.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Block until one byte arrives.
    fn read_byte(&mut self) -> Result<u8>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_all(data)
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }
}
