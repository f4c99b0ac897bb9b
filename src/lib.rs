//! certinfo library: TLS certificate inspection
//!
//! This library connects to one or more hosts, directly or through an HTTP
//! `CONNECT` / SOCKS5 proxy, performs a TLS handshake without trusting the
//! chain, and reports the non-CA certificates the peer presented.
//!
//! # Example
//!
//! ```no_run
//! use certinfo::{parse_targets, CertFetcher, DialPolicy, ErrorAccumulator, FetchOptions, ProxyEnv};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = FetchOptions::default();
//! let targets = parse_targets(&["example.com", "https://example.org:8443"], opts.default_port);
//! let fetcher = CertFetcher::new(DialPolicy::Environment, ProxyEnv::from_env(), opts)?;
//!
//! let mut errors = ErrorAccumulator::new();
//! let results = fetcher
//!     .fetch_all(&targets, &CancellationToken::new(), &mut errors)
//!     .await;
//! for result in &results {
//!     println!("{}: {} certificate(s)", result.authority(), result.certificates.len());
//! }
//! if let Some(combined) = errors.merge_and_clear() {
//!     eprintln!("{combined}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod app;
pub mod config;
mod dial;
mod error_handling;
mod fetch;
pub mod initialization;
mod models;
pub mod output;
mod proxy;
mod target;
mod tls;

// Re-export public API
pub use app::{run, run_with_env, RunOutcome};
pub use config::{Config, FetchOptions, LogFormat, LogLevel, OutputFormat};
pub use error_handling::{
    CombinedError, DialError, ErrorAccumulator, ExpirationWarning, FetchError,
    InitializationError, PolicyError,
};
pub use fetch::CertFetcher;
pub use models::{CertificateRecord, HostResult};
pub use proxy::{
    resolve_policy, resolve_proxy, DialPolicy, ProxyCredentials, ProxyEndpoint, ProxyEnv,
    ResolvedProxy,
};
pub use target::{parse_target, parse_targets, HostSpec};
