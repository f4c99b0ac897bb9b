//! Connection establishment.
//!
//! Opens the raw byte stream for one target, either directly or through an
//! HTTP `CONNECT` / SOCKS5 tunnel. Each call is a single attempt; retrying is
//! the caller's business.

mod http_connect;
mod socks;

use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;

use crate::error_handling::DialError;
use crate::proxy::ResolvedProxy;
use crate::target::{join_host_port, HostSpec};

/// Opens one stream to `target` along `route`.
///
/// # Errors
///
/// Returns [`DialError`] if the TCP connect, the proxy negotiation, or any
/// phase of it exceeds `timeout`. A partially negotiated socket is closed
/// before returning.
pub async fn dial(
    target: &HostSpec,
    route: &ResolvedProxy,
    timeout: Duration,
) -> Result<TcpStream, DialError> {
    match route {
        ResolvedProxy::Direct => dial_direct(&target.host, target.port, timeout).await,
        ResolvedProxy::HttpConnect(endpoint) => {
            http_connect::tunnel(endpoint, target, timeout).await
        }
        ResolvedProxy::Socks5(endpoint) => socks::tunnel(endpoint, target, timeout).await,
    }
}

/// TCP connect to `host:port`, bounded by `timeout`.
pub(crate) async fn dial_direct(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<TcpStream, DialError> {
    let address = join_host_port(host, port);
    debug!("TCP connect to {address}");

    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(DialError::Connect { address, source }),
        Err(_) => Err(DialError::Timeout {
            phase: "TCP connect",
            address,
            timeout_ms: timeout.as_millis(),
        }),
    }
}
