//! In-memory transport.
//!
//! Records every written byte and serves reads from a queue, so protocol
//! output can be asserted byte for byte without hardware.

use std::collections::VecDeque;

use super::Transport;
use crate::error::{ErikaError, Result};

#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    written: Vec<u8>,
    input: VecDeque<u8>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose reads return `input` in order.
    pub fn with_input(input: &[u8]) -> Self {
        Self {
            written: Vec::new(),
            input: input.iter().copied().collect(),
        }
    }

    /// All bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Return and forget the bytes written so far.
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }
}

impl Transport for MemoryTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.written.extend_from_slice(data);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.input
            .pop_front()
            .ok_or_else(|| ErikaError::Transport("No more input bytes".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_writes() {
        let mut transport = MemoryTransport::new();
        transport.write_all(&[0x73, 0x73]).unwrap();
        transport.write_all(&[0x77]).unwrap();
        assert_eq!(transport.written(), &[0x73, 0x73, 0x77]);
        assert_eq!(transport.take_written(), vec![0x73, 0x73, 0x77]);
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_reads_queue_then_fails() {
        let mut transport = MemoryTransport::with_input(&[0x01, 0x02]);
        assert_eq!(transport.read_byte().unwrap(), 0x01);
        assert_eq!(transport.read_byte().unwrap(), 0x02);
        assert!(matches!(transport.read_byte(), Err(ErikaError::Transport(_))));
    }
}
