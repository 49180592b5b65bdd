//! # Printer Module
//!
//! This module provides typewriter-specific configurations.
//!
//! ## Modules
//!
//! - [`config`]: Typewriter hardware specifications

pub mod config;

pub use config::ErikaConfig;
