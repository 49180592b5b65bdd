//! # Typewriter Configuration
//!
//! This module defines hardware specifications for supported typewriters.
//!
//! ## Supported Machines
//!
//! | Model | Baud | Pitch | Page (soft / hard) | Char width |
//! |-------|------|-------|--------------------|------------|
//! | Erika 3004 | 1200 | 12 cpi | 65 / 74 chars × 150 lines | 10 microsteps |
//!
//! ## Usage
//!
//! ```
//! use erika::printer::ErikaConfig;
//!
//! let config = ErikaConfig::ERIKA_3004;
//! println!("Page: {} x {} characters",
//!          config.page_width_soft_limit,
//!          config.page_height);
//! ```
//!
//! A configuration can also be read from JSON; absent fields keep the
//! Erika 3004 defaults:
//!
//! ```
//! use erika::printer::ErikaConfig;
//!
//! let config = ErikaConfig::from_json(r#"{"flow_control": true}"#)?;
//! assert!(config.flow_control);
//! assert_eq!(config.baud_rate, 1200);
//! # Ok::<(), erika::error::ErikaError>(())
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ErikaError, Result};

/// # Typewriter Configuration
///
/// ## Page Limits
///
/// Measured at 12 characters per inch:
/// - **page_width_hard_limit**: the carriage no longer moves beyond this column
/// - **page_width_soft_limit**: the machine beeps on the next key past this column
///
/// ## Timing
///
/// - **settle_delay_ms**: pause after each write when no flow control is available
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ErikaConfig {
    /// Machine model name
    #[serde(skip)]
    pub name: &'static str,

    /// Serial line speed
    pub baud_rate: u32,

    /// Use RTS/CTS hardware flow control instead of fixed delays
    pub flow_control: bool,

    /// Delay after each write without flow control (milliseconds)
    pub settle_delay_ms: u64,

    /// Width of one character cell in horizontal microsteps
    pub char_width_microsteps: u32,

    /// Last usable column before the warning beep
    pub page_width_soft_limit: usize,

    /// Column at which the carriage stops
    pub page_width_hard_limit: usize,

    /// Usable lines per page
    pub page_height: usize,
}

impl Default for ErikaConfig {
    fn default() -> Self {
        Self::ERIKA_3004
    }
}

impl ErikaConfig {
    /// # Robotron Erika 3004
    ///
    /// East German electronic typewriter with a serial interface.
    pub const ERIKA_3004: Self = Self {
        name: "Robotron Erika 3004",
        baud_rate: 1200,
        flow_control: false,
        settle_delay_ms: 500,
        char_width_microsteps: 10,
        page_width_soft_limit: 65,
        page_width_hard_limit: 74,
        page_height: 150,
    };

    /// Parse a configuration from JSON.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Config`] for malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ErikaError::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON file.
    ///
    /// ## Errors
    ///
    /// Returns [`ErikaError::Io`] if the file cannot be read, otherwise as
    /// [`from_json`](Self::from_json).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path.as_ref())?)
    }

    fn validate(&self) -> Result<()> {
        if self.char_width_microsteps == 0 {
            return Err(ErikaError::Config(
                "char_width_microsteps must be at least 1".to_string(),
            ));
        }
        if self.page_width_soft_limit > self.page_width_hard_limit {
            return Err(ErikaError::Config(format!(
                "page_width_soft_limit {} exceeds page_width_hard_limit {}",
                self.page_width_soft_limit, self.page_width_hard_limit
            )));
        }
        Ok(())
    }

    /// Settle delay as a [`Duration`]
    #[inline]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
