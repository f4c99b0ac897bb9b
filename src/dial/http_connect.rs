//! HTTP `CONNECT` tunnelling.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as Base64, Engine};
use log::debug;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::MAX_CONNECT_RESPONSE_BYTES;
use crate::error_handling::DialError;
use crate::proxy::{ProxyCredentials, ProxyEndpoint};
use crate::target::HostSpec;

/// Opens a tunnel to `target` through the HTTP proxy at `endpoint`.
///
/// On success the returned stream is positioned right after the proxy's
/// response head and carries raw bytes to and from the target.
pub(super) async fn tunnel(
    endpoint: &ProxyEndpoint,
    target: &HostSpec,
    timeout: Duration,
) -> Result<TcpStream, DialError> {
    let mut stream = super::dial_direct(&endpoint.host, endpoint.port, timeout).await?;
    let authority = target.authority();
    debug!("CONNECT {authority} via {}", endpoint.authority());

    let request = build_connect_request(&authority, endpoint.credentials.as_ref());
    let head = tokio::time::timeout(timeout, async {
        stream.write_all(request.as_bytes()).await?;
        stream.flush().await?;
        read_response_head(&mut stream).await
    })
    .await
    .map_err(|_| DialError::Timeout {
        phase: "proxy CONNECT",
        address: endpoint.authority(),
        timeout_ms: timeout.as_millis(),
    })??;

    let (status, status_line) = parse_status_line(&head)?;
    if status != 200 {
        return Err(DialError::ProxyConnectRejected {
            target: authority,
            status_line,
        });
    }
    Ok(stream)
}

/// Builds the `CONNECT` request head for `authority`.
pub(crate) fn build_connect_request(
    authority: &str,
    credentials: Option<&ProxyCredentials>,
) -> String {
    let auth_header = credentials
        .map(|c| {
            let token = Base64.encode(format!("{}:{}", c.username, c.password));
            format!("Proxy-Authorization: Basic {token}\r\n")
        })
        .unwrap_or_default();
    format!("CONNECT {authority} HTTP/1.1\r\nHost: {authority}\r\n{auth_header}\r\n")
}

/// Reads up to and including the blank line ending the response head.
///
/// Reads one byte at a time so nothing past the head is consumed.
async fn read_response_head(stream: &mut TcpStream) -> Result<String, DialError> {
    let mut head = Vec::with_capacity(128);
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        if head.len() >= MAX_CONNECT_RESPONSE_BYTES {
            return Err(DialError::ProxyProtocol(format!(
                "response head exceeds {MAX_CONNECT_RESPONSE_BYTES} bytes"
            )));
        }
        if stream.read(&mut byte).await? == 0 {
            return Err(DialError::ProxyProtocol(
                "proxy closed the connection before responding".to_string(),
            ));
        }
        head.push(byte[0]);
    }
    Ok(String::from_utf8_lossy(&head).into_owned())
}

/// Parses `HTTP/1.x <code> <reason>` from a response head.
///
/// Returns the status code and the status line without its line ending.
pub(crate) fn parse_status_line(head: &str) -> Result<(u16, String), DialError> {
    let line = head.lines().next().unwrap_or_default().trim_end();
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(DialError::ProxyProtocol(format!(
            "malformed status line {line:?}"
        )));
    }
    let code = parts
        .next()
        .filter(|code| code.len() == 3)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| DialError::ProxyProtocol(format!("malformed status line {line:?}")))?;
    Ok((code, line.to_string()))
}
