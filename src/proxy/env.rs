//! Environment-derived proxy selection (`HTTPS_PROXY`, `NO_PROXY`).
//!
//! Every target is looked up as if it were reached over `https`, so only
//! `HTTPS_PROXY` is consulted, never `HTTP_PROXY`.

use std::net::IpAddr;

use log::debug;
use url::Url;

/// Proxy settings captured from the environment.
#[derive(Debug, Clone, Default)]
pub struct ProxyEnv {
    https_proxy: Option<String>,
    no_proxy: Vec<NoProxyEntry>,
}

impl ProxyEnv {
    /// Reads `HTTPS_PROXY`/`https_proxy` and `NO_PROXY`/`no_proxy`, upper case first.
    pub fn from_env() -> Self {
        Self::new(
            read_env(&["HTTPS_PROXY", "https_proxy"]).as_deref(),
            read_env(&["NO_PROXY", "no_proxy"]).as_deref(),
        )
    }

    /// Builds settings from explicit values.
    pub fn new(https_proxy: Option<&str>, no_proxy: Option<&str>) -> Self {
        Self {
            https_proxy: https_proxy
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            no_proxy: no_proxy.map(parse_no_proxy).unwrap_or_default(),
        }
    }

    /// Settings with no proxy configured.
    pub fn none() -> Self {
        Self::default()
    }

    /// Proxy to use for `host:port`, or `None` to dial directly.
    pub fn proxy_for(&self, host: &str, port: u16) -> Option<Url> {
        let raw = self.https_proxy.as_deref()?;
        if !use_proxy(host, port, &self.no_proxy) {
            debug!("NO_PROXY excludes {host}:{port}");
            return None;
        }
        let url = parse_proxy_value(raw);
        if url.is_none() {
            debug!("Ignoring unparseable HTTPS_PROXY value");
        }
        url
    }
}

fn read_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
}

/// Parses a proxy value; values without a scheme are read as `http://`.
fn parse_proxy_value(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Some(url),
        _ => Url::parse(&format!("http://{raw}")).ok(),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum NoProxyEntry {
    /// `*`
    All,
    /// IP literal, optionally port-qualified
    Ip { ip: IpAddr, port: Option<u16> },
    /// CIDR range
    Cidr { network: IpAddr, prefix: u8 },
    /// Domain. `exact` entries also match the bare domain, not just subdomains.
    Domain {
        suffix: String,
        exact: bool,
        port: Option<u16>,
    },
}

fn parse_no_proxy(value: &str) -> Vec<NoProxyEntry> {
    value
        .split(',')
        .map(|entry| entry.trim().to_ascii_lowercase())
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| parse_no_proxy_entry(&entry))
        .collect()
}

fn parse_no_proxy_entry(entry: &str) -> Option<NoProxyEntry> {
    if entry == "*" {
        return Some(NoProxyEntry::All);
    }

    if let Some((network, prefix)) = entry.split_once('/') {
        let network: IpAddr = network.parse().ok()?;
        let prefix: u8 = prefix.parse().ok()?;
        let max = if network.is_ipv4() { 32 } else { 128 };
        return (prefix <= max).then_some(NoProxyEntry::Cidr { network, prefix });
    }

    if let Ok(ip) = entry.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
        return Some(NoProxyEntry::Ip { ip, port: None });
    }

    let (host, port) = split_entry_port(entry);
    if let Ok(ip) = host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
        return Some(NoProxyEntry::Ip { ip, port });
    }

    let host = host.strip_prefix('*').unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    match host.strip_prefix('.') {
        Some(rest) if !rest.is_empty() => Some(NoProxyEntry::Domain {
            suffix: host.to_string(),
            exact: false,
            port,
        }),
        Some(_) => None,
        None => Some(NoProxyEntry::Domain {
            suffix: format!(".{host}"),
            exact: true,
            port,
        }),
    }
}

fn split_entry_port(entry: &str) -> (&str, Option<u16>) {
    match entry.rsplit_once(':') {
        Some((host, port)) if !host.ends_with(':') => match port.parse() {
            Ok(port) => (host, Some(port)),
            Err(_) => (entry, None),
        },
        _ => (entry, None),
    }
}

/// Whether a proxy should be used for this target.
fn use_proxy(host: &str, port: u16, entries: &[NoProxyEntry]) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host == "localhost" {
        return false;
    }
    let ip = host.parse::<IpAddr>().ok();
    if ip.is_some_and(|ip| ip.is_loopback()) {
        return false;
    }

    !entries.iter().any(|entry| match entry {
        NoProxyEntry::All => true,
        NoProxyEntry::Ip {
            ip: entry_ip,
            port: entry_port,
        } => ip == Some(*entry_ip) && entry_port.is_none_or_eq(port),
        NoProxyEntry::Cidr { network, prefix } => {
            ip.is_some_and(|ip| cidr_contains(*network, *prefix, ip))
        }
        NoProxyEntry::Domain {
            suffix,
            exact,
            port: entry_port,
        } => {
            let matched = host.ends_with(suffix.as_str()) || (*exact && host == suffix[1..]);
            matched && entry_port.is_none_or_eq(port)
        }
    })
}

trait PortFilter {
    fn is_none_or_eq(&self, port: u16) -> bool;
}

impl PortFilter for Option<u16> {
    fn is_none_or_eq(&self, port: u16) -> bool {
        self.map_or(true, |p| p == port)
    }
}

fn cidr_contains(network: IpAddr, prefix: u8, ip: IpAddr) -> bool {
    match (network, ip) {
        (IpAddr::V4(net), IpAddr::V4(ip)) => {
            let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            u32::from(net) & mask == u32::from(ip) & mask
        }
        (IpAddr::V6(net), IpAddr::V6(ip)) => {
            let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
            u128::from(net) & mask == u128::from(ip) & mask
        }
        _ => false,
    }
}
