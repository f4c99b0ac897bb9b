//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (default ports, timeouts, limits)
//! - CLI option types and parsing
//! - Duration flag parsing

mod constants;
mod duration;
mod types;

// Re-export all constants
pub use constants::*;
pub use duration::{parse_duration, parse_threshold};
pub use types::{Config, FetchOptions, LogFormat, LogLevel, OutputFormat};
