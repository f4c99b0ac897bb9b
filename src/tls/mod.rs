//! TLS handshake and certificate harvesting.
//!
//! Wraps an established stream in a TLS client session with SNI set to the
//! target host and chain verification disabled, then projects the peer's
//! non-CA certificates into [`CertificateRecord`]s.
//!
//! Uses `tokio-rustls` for async TLS connections and `x509-parser` for certificate parsing.

mod extract;
mod verifier;

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use rustls::crypto::ring::default_provider;
use rustls::pki_types::ServerName;
use rustls::ClientConfig;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

use crate::error_handling::FetchError;
use crate::models::CertificateRecord;

use verifier::AcceptAnyCertificate;

/// Builds the client configuration used for every handshake.
///
/// The `ring` provider is passed explicitly so the configuration does not
/// depend on which process-wide default is installed.
pub(crate) fn client_config() -> Result<Arc<ClientConfig>, FetchError> {
    let provider = Arc::new(default_provider());
    let verifier = Arc::new(AcceptAnyCertificate::new(&provider));
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth();
    Ok(Arc::new(config))
}

/// Performs the TLS handshake over `stream` with SNI `host`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidServerName`], [`FetchError::Handshake`] or
/// [`FetchError::HandshakeTimeout`]. None of them are retried by the caller.
pub(crate) async fn handshake(
    connector: &TlsConnector,
    stream: TcpStream,
    host: &str,
    address: &str,
    timeout: Duration,
) -> Result<TlsStream<TcpStream>, FetchError> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| FetchError::InvalidServerName(host.to_string()))?;

    debug!("TLS handshake with {address}");
    match tokio::time::timeout(timeout, connector.connect(server_name, stream)).await {
        Ok(Ok(tls)) => Ok(tls),
        Ok(Err(source)) => Err(FetchError::Handshake {
            address: address.to_string(),
            source,
        }),
        Err(_) => Err(FetchError::HandshakeTimeout {
            address: address.to_string(),
            timeout_ms: timeout.as_millis(),
        }),
    }
}

/// Non-CA peer certificates of a completed session, in presentation order.
pub(crate) fn harvest(
    tls: &TlsStream<TcpStream>,
    address: &str,
) -> Result<Vec<CertificateRecord>, FetchError> {
    let Some(chain) = tls.get_ref().1.peer_certificates() else {
        return Ok(Vec::new());
    };

    let mut records = Vec::with_capacity(chain.len());
    for der in chain {
        match extract::certificate_record(der.as_ref()) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => debug!("Skipping CA certificate from {address}"),
            Err(reason) => {
                return Err(FetchError::CertificateParse {
                    address: address.to_string(),
                    reason,
                })
            }
        }
    }
    Ok(records)
}

/// Sends `close_notify` and drops the session. Failures are ignored.
pub(crate) async fn close(mut tls: TlsStream<TcpStream>, timeout: Duration) {
    if let Ok(Err(e)) = tokio::time::timeout(timeout, tls.shutdown()).await {
        debug!("TLS shutdown failed: {e}");
    }
}
