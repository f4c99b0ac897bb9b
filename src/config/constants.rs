//! Configuration constants.
//!
//! Defaults shared by the CLI layer and the library-facing [`FetchOptions`](super::FetchOptions).

use std::time::Duration;

/// Port used for targets that do not carry one.
pub const DEFAULT_PORT: u16 = 443;

/// Per-attempt dial timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Dial attempts per host.
pub const DEFAULT_RETRY: u32 = 2;

/// Port assumed for an `http://` or `https://` proxy URL without an explicit port.
///
/// Many deployments use 3128 instead; override with `--proxy-default-port`.
pub const DEFAULT_HTTP_PROXY_PORT: u16 = 8080;

/// Port assumed for a `socks5://` or `socks5h://` proxy URL without an explicit port.
pub const DEFAULT_SOCKS_PROXY_PORT: u16 = 1080;

/// Upper bound on the size of a proxy's CONNECT response head.
pub const MAX_CONNECT_RESPONSE_BYTES: usize = 8 * 1024;

/// Proxy URL schemes accepted by `--proxy` and the environment.
pub const SUPPORTED_PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Layout used for certificate validity timestamps in the text report.
pub const TEXT_DATE_FORMAT: &str = "%A, %-d %B %Y at %H:%M:%S (%:z)";

/// Placeholder printed when a certificate carries no DNS names.
pub const NO_DNS_NAMES_PLACEHOLDER: &str = "—";
