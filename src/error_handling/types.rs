//! Error type definitions.
//!
//! Configuration errors abort a run before any network activity. Dial errors are
//! retried; fetch errors are terminal for one host and end up in the
//! [`ErrorAccumulator`](super::ErrorAccumulator).

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Configuration-time errors raised while resolving the dial policy.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// The proxy value could not be parsed as a URL.
    #[error("invalid proxy URL {value:?}: {source}")]
    InvalidProxyUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// The proxy URL uses a scheme other than http, https, socks5 or socks5h.
    #[error("unsupported proxy scheme {0:?}")]
    UnsupportedProxyScheme(String),

    /// The proxy URL has no host component.
    #[error("proxy URL {0:?} has no host")]
    MissingProxyHost(String),
}

/// Failure of a single dial attempt. Always retried within one host's fetch.
#[derive(Error, Debug)]
pub enum DialError {
    /// TCP connect to the target or proxy failed.
    #[error("connect to {address} failed: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// A dial phase did not finish within the configured timeout.
    #[error("{phase} for {address} timed out after {timeout_ms}ms")]
    Timeout {
        phase: &'static str,
        address: String,
        timeout_ms: u128,
    },

    /// The HTTP proxy answered the CONNECT request with a non-200 status.
    #[error("proxy CONNECT to {target} failed: {status_line}")]
    ProxyConnectRejected { target: String, status_line: String },

    /// The HTTP proxy sent a response that could not be understood.
    #[error("proxy protocol error: {0}")]
    ProxyProtocol(String),

    /// SOCKS5 negotiation or relay setup failed.
    #[error("SOCKS5 relay to {target} via {proxy} failed: {source}")]
    Socks5 {
        proxy: String,
        target: String,
        #[source]
        source: tokio_socks::Error,
    },

    /// Reading from or writing to the proxy connection failed.
    #[error("proxy I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal failure for one host.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Every dial attempt failed.
    #[error("cannot connect to {address} after {attempts} attempt(s): {source}")]
    ConnectionExhausted {
        address: String,
        attempts: u32,
        #[source]
        source: DialError,
    },

    /// The TLS client configuration could not be built.
    #[error("TLS client configuration error: {0}")]
    TlsConfig(#[from] rustls::Error),

    /// The host name cannot be used as a TLS server name.
    #[error("invalid server name {0:?}")]
    InvalidServerName(String),

    /// The TLS handshake failed. Never retried.
    #[error("TLS handshake with {address} failed: {source}")]
    Handshake {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The TLS handshake did not finish within the configured timeout.
    #[error("TLS handshake with {address} timed out after {timeout_ms}ms")]
    HandshakeTimeout { address: String, timeout_ms: u128 },

    /// A peer certificate could not be decoded.
    #[error("cannot parse certificate from {address}: {reason}")]
    CertificateParse { address: String, reason: String },

    /// The run was cancelled before the host finished.
    #[error("fetch of {0} cancelled")]
    Cancelled(String),
}

/// A certificate that expires within the configured threshold.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("certificate for {subject} expires in {days:.2} days (at {not_after})")]
pub struct ExpirationWarning {
    /// Subject common name of the certificate
    pub subject: String,
    /// Days until `notAfter` (negative when already expired)
    pub days: f64,
    /// `notAfter` rendered as RFC 3339
    pub not_after: String,
}
