//! Target parsing.
//!
//! Turns free-form target strings into normalized host/port pairs. Parsing
//! never drops a target: anything that cannot be split is used verbatim as a
//! hostname with the default port.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized target: host without brackets, scheme, path or port suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostSpec {
    /// DNS name or IP literal
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl HostSpec {
    /// Creates a host spec.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn authority(&self) -> String {
        join_host_port(&self.host, self.port)
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority())
    }
}

/// Joins a host and port, bracketing hosts that contain a colon.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Parses every target, preserving input order.
pub fn parse_targets<S: AsRef<str>>(targets: &[S], default_port: u16) -> Vec<HostSpec> {
    targets
        .iter()
        .map(|raw| parse_target(raw.as_ref(), default_port))
        .collect()
}

/// Parses one target string.
///
/// Tried in order: URL with a host component, scheme-relative `//authority`,
/// bracketed IPv6 literal, `host:port`, and finally the whole string as a
/// hostname.
pub fn parse_target(raw: &str, default_port: u16) -> HostSpec {
    let raw = raw.trim();

    if let Some(spec) = parse_as_url(raw, default_port) {
        return spec;
    }

    // Scheme-relative `//host[:port]/path`.
    if raw.starts_with("//") {
        if let Some(spec) = parse_as_url(&format!("https:{raw}"), default_port) {
            return spec;
        }
    }

    if let Some(inner) = raw.strip_prefix('[') {
        return parse_bracketed(raw, inner, default_port);
    }

    if raw.contains(':') {
        if let Some((host, port)) = split_host_port(raw) {
            return HostSpec::new(host, port.parse().unwrap_or(default_port));
        }
    }

    HostSpec::new(raw, default_port)
}

fn parse_as_url(raw: &str, default_port: u16) -> Option<HostSpec> {
    // "host:port" parses as a URL with scheme "host"; only accept real authorities.
    if !raw.contains("://") {
        return None;
    }
    let url = url::Url::parse(raw).ok()?;
    let host = match url.host()? {
        url::Host::Domain(domain) => domain.to_string(),
        url::Host::Ipv4(ip) => ip.to_string(),
        url::Host::Ipv6(ip) => ip.to_string(),
    };
    if host.is_empty() {
        return None;
    }
    // `Url::port` hides the scheme's default port, so read it from the authority.
    let port = explicit_url_port(raw).unwrap_or(default_port);
    Some(HostSpec::new(host, port))
}

fn explicit_url_port(raw: &str) -> Option<u16> {
    let after_scheme = &raw[raw.find("://")? + 3..];
    let authority = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(after_scheme);
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let port = if host_port.starts_with('[') {
        host_port.split_once("]:")?.1
    } else {
        host_port.rsplit_once(':')?.1
    };
    port.parse().ok()
}

fn parse_bracketed(raw: &str, inner: &str, default_port: u16) -> HostSpec {
    match inner.split_once(']') {
        Some((host, rest)) => {
            let port = rest
                .strip_prefix(':')
                .and_then(|p| p.parse().ok())
                .unwrap_or(default_port);
            HostSpec::new(host, port)
        }
        None => HostSpec::new(raw.trim_matches(|c| c == '[' || c == ']'), default_port),
    }
}

/// Splits `host:port`. Fails when the host part itself contains a colon
/// (an unbracketed IPv6 literal). The port is not validated here.
fn split_host_port(raw: &str) -> Option<(&str, &str)> {
    let (host, port) = raw.rsplit_once(':')?;
    if host.contains(':') {
        return None;
    }
    Some((host, port))
}
