//! Application initialization.
//!
//! This module provides functions to initialize process-wide resources:
//! - Logger
//! - TLS crypto provider
//!
//! All initialization functions return proper error types for error handling.

mod logger;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use logger::init_logger_with;

/// Initializes the crypto provider for TLS operations.
///
/// Installs `ring` as the process-wide default for `rustls`. The fetcher
/// passes its provider explicitly, so this only matters for code paths that
/// rely on the default.
pub fn init_crypto_provider() {
    // The return value is ignored because reinstalling the provider is harmless
    let _ = CryptoProvider::install_default(default_provider());
}
