//! Error handling.
//!
//! This module provides:
//! - Error type definitions for policy, dial and fetch failures
//! - The per-run error accumulator
//!
//! Error types are categorized into:
//! - **Configuration errors**: abort the run before any dialing
//! - **Dial errors**: retried up to the configured attempt count
//! - **Fetch errors**: terminal for one host, accumulated, never abort the batch
//! - **Expiration warnings**: accumulated after rendering

mod accumulator;
mod types;

// Re-export public API
pub use accumulator::{CombinedError, ErrorAccumulator};
pub use types::{DialError, ExpirationWarning, FetchError, InitializationError, PolicyError};
