//! Proxy selection.
//!
//! This module provides:
//! - [`DialPolicy`] resolution from the `--proxy` / `--no-proxy` flags
//! - Environment lookup (`HTTPS_PROXY`, `NO_PROXY`) through [`ProxyEnv`]
//! - [`resolve_proxy`], which picks the concrete route for one target

mod env;
mod policy;

use std::fmt;

use log::{debug, warn};
use percent_encoding::percent_decode_str;
use url::Url;

use crate::config::FetchOptions;
use crate::target::{join_host_port, HostSpec};

pub use env::ProxyEnv;
pub use policy::{resolve_policy, DialPolicy};

/// Credentials taken from a proxy URL's userinfo, percent-decoded.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    /// User name
    pub username: String,
    /// Password (empty when the URL had none)
    pub password: String,
}

impl fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Address of a proxy server plus optional credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    /// Proxy host (IPv6 literals unbracketed)
    pub host: String,
    /// Proxy port
    pub port: u16,
    /// Userinfo from the proxy URL
    pub credentials: Option<ProxyCredentials>,
}

impl ProxyEndpoint {
    /// `host:port` of the proxy.
    pub fn authority(&self) -> String {
        join_host_port(&self.host, self.port)
    }
}

/// Concrete route used to reach one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedProxy {
    /// Dial the target itself.
    Direct,
    /// Tunnel through an HTTP proxy with `CONNECT`.
    HttpConnect(ProxyEndpoint),
    /// Relay through a SOCKS5 proxy; the target name is resolved by the proxy.
    Socks5(ProxyEndpoint),
}

impl ResolvedProxy {
    /// Builds a route from a proxy URL.
    ///
    /// Unknown schemes and URLs without a host fall back to [`ResolvedProxy::Direct`].
    pub fn from_url(url: &Url, opts: &FetchOptions) -> Self {
        let Some(host) = url_host(url) else {
            warn!("Proxy URL {} has no host, dialing directly", redact(url));
            return ResolvedProxy::Direct;
        };
        let scheme = url.scheme().to_ascii_lowercase();
        let credentials = credentials(url);

        match scheme.as_str() {
            "http" | "https" => ResolvedProxy::HttpConnect(ProxyEndpoint {
                host,
                port: url.port().unwrap_or(opts.proxy_default_port),
                credentials,
            }),
            "socks5" | "socks5h" => ResolvedProxy::Socks5(ProxyEndpoint {
                host,
                port: url.port().unwrap_or(opts.socks_default_port),
                credentials,
            }),
            other => {
                warn!("Unsupported proxy scheme {other:?}, dialing directly");
                ResolvedProxy::Direct
            }
        }
    }

    /// The proxy endpoint, if any.
    pub fn endpoint(&self) -> Option<&ProxyEndpoint> {
        match self {
            ResolvedProxy::Direct => None,
            ResolvedProxy::HttpConnect(endpoint) | ResolvedProxy::Socks5(endpoint) => {
                Some(endpoint)
            }
        }
    }
}

impl fmt::Display for ResolvedProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedProxy::Direct => f.write_str("direct"),
            ResolvedProxy::HttpConnect(endpoint) => {
                write!(f, "http CONNECT via {}", endpoint.authority())
            }
            ResolvedProxy::Socks5(endpoint) => write!(f, "socks5 via {}", endpoint.authority()),
        }
    }
}

/// Picks the route for `target` under `policy`.
///
/// The environment is only consulted for [`DialPolicy::Environment`].
pub fn resolve_proxy(
    policy: &DialPolicy,
    env: &ProxyEnv,
    target: &HostSpec,
    opts: &FetchOptions,
) -> ResolvedProxy {
    let resolved = match policy {
        DialPolicy::Direct => ResolvedProxy::Direct,
        DialPolicy::Explicit(url) => ResolvedProxy::from_url(url, opts),
        DialPolicy::Environment => env
            .proxy_for(&target.host, target.port)
            .map_or(ResolvedProxy::Direct, |url| {
                ResolvedProxy::from_url(&url, opts)
            }),
    };
    debug!("Route for {target}: {resolved}");
    resolved
}

/// Renders a proxy URL with its password hidden, for logging.
pub(crate) fn redact(url: &Url) -> String {
    if url.password().is_none() {
        return url.to_string();
    }
    let mut redacted = url.clone();
    // Only fails for URLs that cannot carry credentials, which have no password either.
    let _ = redacted.set_password(Some("xxxxx"));
    redacted.to_string()
}

fn url_host(url: &Url) -> Option<String> {
    match url.host()? {
        url::Host::Domain(domain) if !domain.is_empty() => Some(domain.to_string()),
        url::Host::Domain(_) => None,
        url::Host::Ipv4(ip) => Some(ip.to_string()),
        url::Host::Ipv6(ip) => Some(ip.to_string()),
    }
}

fn credentials(url: &Url) -> Option<ProxyCredentials> {
    if url.username().is_empty() && url.password().is_none() {
        return None;
    }
    Some(ProxyCredentials {
        username: percent_decode(url.username()),
        password: url.password().map(percent_decode).unwrap_or_default(),
    })
}

/// Decodes `%XX` escapes. Malformed escapes are kept verbatim.
fn percent_decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}
