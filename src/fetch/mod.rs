//! Certificate fetching.
//!
//! One host at a time: dial (retried), handshake (never retried), harvest.
//! Each host runs through [`FetchState`] so a failed handshake can only end
//! the fetch; there is no transition from handshaking back to dialing.

use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tokio_util::sync::CancellationToken;

use crate::config::FetchOptions;
use crate::dial::dial;
use crate::error_handling::{DialError, ErrorAccumulator, FetchError};
use crate::models::{CertificateRecord, HostResult};
use crate::proxy::{resolve_proxy, DialPolicy, ProxyEnv, ResolvedProxy};
use crate::target::HostSpec;
use crate::tls;

/// Progress of a single host's fetch.
enum FetchState {
    /// Attempt number `attempt` (1-based) is about to dial.
    Dialing { attempt: u32 },
    /// A stream is open; the TLS handshake is next.
    Handshaking(TcpStream),
    /// The handshake completed; certificates are read next.
    Harvesting(TlsStream<TcpStream>),
    /// Every dial attempt failed; holds the last error.
    Exhausted(DialError),
    /// Handshake or harvest failed.
    Failed(FetchError),
    /// Certificates were read and the connection closed.
    Harvested(Vec<CertificateRecord>),
}

/// Fetches peer certificates for targets under one dial policy.
///
/// The policy, proxy environment and TLS configuration are fixed for the
/// fetcher's lifetime and shared read-only by every host.
pub struct CertFetcher {
    policy: DialPolicy,
    env: ProxyEnv,
    opts: FetchOptions,
    connector: TlsConnector,
}

impl CertFetcher {
    /// Creates a fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::TlsConfig`] if the TLS client configuration
    /// cannot be built.
    pub fn new(policy: DialPolicy, env: ProxyEnv, opts: FetchOptions) -> Result<Self, FetchError> {
        Ok(Self {
            policy,
            env,
            opts,
            connector: TlsConnector::from(tls::client_config()?),
        })
    }

    /// Fetches the non-CA certificates of one target.
    ///
    /// Dial attempts are retried immediately, up to
    /// [`FetchOptions::attempts`]. The handshake runs at most once.
    ///
    /// # Errors
    ///
    /// - [`FetchError::ConnectionExhausted`] when every dial attempt fails
    /// - [`FetchError::Handshake`] / [`FetchError::HandshakeTimeout`] /
    ///   [`FetchError::InvalidServerName`] when the handshake fails
    /// - [`FetchError::CertificateParse`] when a peer certificate cannot be decoded
    /// - [`FetchError::Cancelled`] when `cancel` fires first
    pub async fn fetch_one(
        &self,
        target: &HostSpec,
        cancel: &CancellationToken,
    ) -> Result<HostResult, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled(target.authority())),
            result = self.run(target) => result,
        }
    }

    /// Fetches every target in order.
    ///
    /// Failures are pushed to `errors` and the batch moves on. Successful
    /// results keep input order; failed hosts are left out. Once `cancel`
    /// fires, the host in flight is reported as cancelled and the rest are
    /// skipped.
    pub async fn fetch_all(
        &self,
        targets: &[HostSpec],
        cancel: &CancellationToken,
        errors: &mut ErrorAccumulator,
    ) -> Vec<HostResult> {
        let mut results = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter().enumerate() {
            match self.fetch_one(target, cancel).await {
                Ok(result) => results.push(result),
                Err(err @ FetchError::Cancelled(_)) => {
                    errors.push(err);
                    let skipped = targets.len() - index - 1;
                    if skipped > 0 {
                        warn!("Cancelled, skipping {skipped} remaining host(s)");
                    }
                    break;
                }
                Err(err) => errors.push(err),
            }
        }
        results
    }

    async fn run(&self, target: &HostSpec) -> Result<HostResult, FetchError> {
        let address = target.authority();
        let route = resolve_proxy(&self.policy, &self.env, target, &self.opts);
        let attempts = self.opts.attempts();
        let timeout = self.opts.timeout;
        info!("Connecting to {address} ({route})");

        let mut state = FetchState::Dialing { attempt: 1 };
        loop {
            state = match state {
                FetchState::Dialing { attempt } => {
                    match self.dial_attempt(target, &route, attempt).await {
                        Ok(stream) => FetchState::Handshaking(stream),
                        Err(e) if attempt < attempts => {
                            warn!("Connect attempt {attempt}/{attempts} to {address} failed: {e}");
                            FetchState::Dialing {
                                attempt: attempt + 1,
                            }
                        }
                        Err(e) => {
                            warn!("Connect attempt {attempt}/{attempts} to {address} failed: {e}");
                            FetchState::Exhausted(e)
                        }
                    }
                }
                FetchState::Handshaking(stream) => {
                    match tls::handshake(&self.connector, stream, &target.host, &address, timeout)
                        .await
                    {
                        Ok(tls) => FetchState::Harvesting(tls),
                        Err(e) => FetchState::Failed(e),
                    }
                }
                FetchState::Harvesting(tls) => {
                    let harvested = tls::harvest(&tls, &address);
                    tls::close(tls, timeout).await;
                    match harvested {
                        Ok(certificates) => FetchState::Harvested(certificates),
                        Err(e) => FetchState::Failed(e),
                    }
                }
                FetchState::Exhausted(source) => {
                    return Err(FetchError::ConnectionExhausted {
                        address,
                        attempts,
                        source,
                    })
                }
                FetchState::Failed(err) => return Err(err),
                FetchState::Harvested(certificates) => {
                    info!("Harvested {} certificate(s) from {address}", certificates.len());
                    return Ok(HostResult::new(target, certificates));
                }
            };
        }
    }

    async fn dial_attempt(
        &self,
        target: &HostSpec,
        route: &ResolvedProxy,
        attempt: u32,
    ) -> Result<TcpStream, DialError> {
        debug!("Dial attempt {attempt} for {target} ({route})");
        dial(target, route, self.opts.timeout).await
    }
}
