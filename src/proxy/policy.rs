//! Dial policy resolution from user intent.

use log::debug;
use url::Url;

use crate::config::SUPPORTED_PROXY_SCHEMES;
use crate::error_handling::PolicyError;

/// How outbound connections are established for a whole run.
///
/// Immutable once resolved and shared read-only across every host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DialPolicy {
    /// Always dial the target directly; proxy settings are never consulted.
    Direct,
    /// Always tunnel through this proxy.
    Explicit(Url),
    /// Defer to `HTTPS_PROXY` / `NO_PROXY` at dial time.
    #[default]
    Environment,
}

impl DialPolicy {
    /// Returns `true` if proxies are bypassed unconditionally.
    pub fn force_direct(&self) -> bool {
        matches!(self, DialPolicy::Direct)
    }

    /// The explicit proxy URL, if one was configured.
    pub fn explicit_proxy(&self) -> Option<&Url> {
        match self {
            DialPolicy::Explicit(url) => Some(url),
            _ => None,
        }
    }
}

/// Resolves the dial policy: `--no-proxy` > `--proxy` > environment.
///
/// `no_proxy` short-circuits everything, including a proxy value that would
/// otherwise be rejected.
///
/// # Errors
///
/// Returns [`PolicyError`] when `proxy` is not a URL, has no host, or uses a
/// scheme other than `http`, `https`, `socks5` or `socks5h`.
pub fn resolve_policy(no_proxy: bool, proxy: &str) -> Result<DialPolicy, PolicyError> {
    if no_proxy {
        debug!("Dial policy: direct (--no-proxy)");
        return Ok(DialPolicy::Direct);
    }

    let proxy = proxy.trim();
    if proxy.is_empty() {
        debug!("Dial policy: environment");
        return Ok(DialPolicy::Environment);
    }

    let url = Url::parse(proxy).map_err(|source| PolicyError::InvalidProxyUrl {
        value: proxy.to_string(),
        source,
    })?;
    if !SUPPORTED_PROXY_SCHEMES.contains(&url.scheme()) {
        return Err(PolicyError::UnsupportedProxyScheme(url.scheme().to_string()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(PolicyError::MissingProxyHost(proxy.to_string()));
    }

    debug!("Dial policy: explicit proxy {}", super::redact(&url));
    Ok(DialPolicy::Explicit(url))
}
