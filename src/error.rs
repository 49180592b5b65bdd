//! # Error Types
//!
//! This module defines error types used throughout the erika library.

use thiserror::Error;

/// Main error type for erika operations
#[derive(Debug, Error)]
pub enum ErikaError {
    /// Character (or key code) outside the character table
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Numeric argument outside the range a command can carry
    #[error("Range error: {0}")]
    Range(String),

    /// Unrecognized or unsupported escape sequence
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A cell that was already printed was printed again
    #[error("Overprint at ({x}, {y})")]
    Overprint { x: usize, y: usize },

    /// Printing outside the simulated page
    #[error("Print at ({x}, {y}) is outside the page")]
    OutOfPage { x: i64, y: i64 },

    /// Transport-level errors (connection, I/O on the serial link)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Image loading error
    #[error("Image error: {0}")]
    Image(String),

    /// Malformed character table or configuration
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ErikaError>;
