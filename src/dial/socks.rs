//! SOCKS5 relaying.

use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;
use tokio_socks::tcp::Socks5Stream;

use crate::error_handling::DialError;
use crate::proxy::{ProxyCredentials, ProxyEndpoint};
use crate::target::HostSpec;

/// Opens a relay to `target` through the SOCKS5 proxy at `endpoint`.
///
/// The target host name is sent to the proxy as-is, so name resolution happens
/// on the proxy side for both `socks5` and `socks5h`.
pub(super) async fn tunnel(
    endpoint: &ProxyEndpoint,
    target: &HostSpec,
    timeout: Duration,
) -> Result<TcpStream, DialError> {
    debug!(
        "SOCKS5 relay to {} via {}",
        target.authority(),
        endpoint.authority()
    );

    if endpoint.credentials.as_ref().is_some_and(|c| !rfc1929_valid(c)) {
        debug!(
            "SOCKS5 credentials for {} are not 1-255 bytes each, connecting without auth",
            endpoint.authority()
        );
    }

    let proxy_addr = (endpoint.host.as_str(), endpoint.port);
    let target_addr = (target.host.as_str(), target.port);

    let negotiation = async {
        match endpoint.credentials.as_ref().filter(|c| rfc1929_valid(c)) {
            Some(creds) => {
                Socks5Stream::connect_with_password(
                    proxy_addr,
                    target_addr,
                    &creds.username,
                    &creds.password,
                )
                .await
            }
            None => Socks5Stream::connect(proxy_addr, target_addr).await,
        }
    };

    match tokio::time::timeout(timeout, negotiation).await {
        Ok(Ok(stream)) => Ok(stream.into_inner()),
        Ok(Err(source)) => Err(DialError::Socks5 {
            proxy: endpoint.authority(),
            target: target.authority(),
            source,
        }),
        Err(_) => Err(DialError::Timeout {
            phase: "SOCKS5 negotiation",
            address: endpoint.authority(),
            timeout_ms: timeout.as_millis(),
        }),
    }
}

/// Username/password auth needs both fields between 1 and 255 bytes.
fn rfc1929_valid(creds: &ProxyCredentials) -> bool {
    let valid = |field: &str| (1..=255).contains(&field.len());
    valid(&creds.username) && valid(&creds.password)
}
