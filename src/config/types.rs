//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use super::constants::{
    DEFAULT_HTTP_PROXY_PORT, DEFAULT_PORT, DEFAULT_RETRY, DEFAULT_SOCKS_PROXY_PORT,
    DEFAULT_TIMEOUT,
};
use super::duration::{parse_duration, parse_threshold};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Report format written to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Line-oriented human-readable report
    Text,
    /// Pretty-printed JSON array
    Json,
    /// No report; errors still affect the exit code
    None,
}

/// Command-line options and configuration.
///
/// # Examples
///
/// ```bash
/// # Single host, default port 443
/// certinfo example.com
///
/// # Several targets, JSON output, warn when a certificate expires within 30 days
/// certinfo example.com https://example.org:8443 -o json -t 720h
///
/// # Through an explicit SOCKS5 proxy
/// certinfo example.com --proxy socks5h://127.0.0.1:1080
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "certinfo",
    version,
    about = "Get information about the TLS certificates of one or more hosts.",
    long_about = "Get information about the TLS certificates of one or more hosts.\n\n\
        Targets may be bare hostnames, host:port pairs, bracketed IPv6 literals or URLs.\n\
        If --threshold is set and a certificate expires within that window, certinfo\n\
        exits with status 1."
)]
pub struct Config {
    /// Hosts to query (hostname, host:port, [ipv6]:port or URL)
    #[arg(required = true, value_name = "HOSTS")]
    pub hosts: Vec<String>,

    /// Port used for targets that do not specify one
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Dial timeout per attempt (e.g. 5s, 1m)
    #[arg(long, value_parser = parse_duration, default_value = "5s")]
    pub timeout: Duration,

    /// Dial attempts per host before giving up
    #[arg(long, default_value_t = DEFAULT_RETRY)]
    pub retry: u32,

    /// Output format: text|json|none
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Warn if a certificate expires within this window (e.g. 720h; a bare number means days)
    #[arg(short, long, value_parser = parse_threshold, default_value = "0s")]
    pub threshold: Duration,

    /// Proxy URL (http[s]:// or socks5[h]://); overrides the environment
    #[arg(long, conflicts_with = "no_proxy")]
    pub proxy: Option<String>,

    /// Bypass all proxies, including HTTPS_PROXY from the environment
    #[arg(long)]
    pub no_proxy: bool,

    /// Port assumed for an http(s) proxy URL without one
    #[arg(long, default_value_t = DEFAULT_HTTP_PROXY_PORT)]
    pub proxy_default_port: u16,

    /// Port assumed for a socks5(h) proxy URL without one
    #[arg(long, default_value_t = DEFAULT_SOCKS_PROXY_PORT)]
    pub socks_default_port: u16,

    /// Only log errors
    #[arg(short, long)]
    pub silent: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// Effective log level, taking `--silent` into account.
    pub fn effective_log_level(&self) -> log::LevelFilter {
        if self.silent {
            log::LevelFilter::Error
        } else {
            self.log_level.clone().into()
        }
    }

    /// The subset of options the fetcher needs.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            default_port: self.port,
            timeout: self.timeout,
            retry: self.retry,
            proxy_default_port: self.proxy_default_port,
            socks_default_port: self.socks_default_port,
        }
    }
}

/// Library configuration for the certificate fetcher (no CLI dependencies).
///
/// ```no_run
/// use certinfo::FetchOptions;
/// use std::time::Duration;
///
/// let opts = FetchOptions {
///     timeout: Duration::from_secs(2),
///     retry: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Port for targets without one
    pub default_port: u16,
    /// Bound on each dial attempt, the CONNECT/SOCKS negotiation and the TLS handshake
    pub timeout: Duration,
    /// Dial attempts per host (at least one attempt is always made)
    pub retry: u32,
    /// Port for http(s) proxy URLs without one
    pub proxy_default_port: u16,
    /// Port for socks5(h) proxy URLs without one
    pub socks_default_port: u16,
}

impl FetchOptions {
    /// Number of dial attempts, never less than one.
    pub fn attempts(&self) -> u32 {
        self.retry.max(1)
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            retry: DEFAULT_RETRY,
            proxy_default_port: DEFAULT_HTTP_PROXY_PORT,
            socks_default_port: DEFAULT_SOCKS_PROXY_PORT,
        }
    }
}
