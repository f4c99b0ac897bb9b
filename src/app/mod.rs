//! Application flow.
//!
//! This module ties the pieces together for one CLI invocation: dial policy,
//! target parsing, fetching, rendering, expiration checks and the final error
//! merge. Signal handling lives in [`shutdown`].

pub mod logging;
pub mod shutdown;

use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error_handling::{CombinedError, ErrorAccumulator};
use crate::fetch::CertFetcher;
use crate::models::HostResult;
use crate::output::{check_expiration, write_report};
use crate::proxy::{resolve_policy, ProxyEnv};
use crate::target::parse_targets;

pub use logging::log_summary;
pub use shutdown::cancel_on_ctrl_c;

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Hosts whose certificates were harvested, in input order
    pub results: Vec<HostResult>,
    /// Every per-host failure and expiration warning, merged
    pub combined: Option<CombinedError>,
}

impl RunOutcome {
    /// Process exit code: 0 when nothing was accumulated, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.combined.is_some())
    }
}

/// Runs one invocation with proxy settings read from the environment.
///
/// # Errors
///
/// Returns an error for configuration problems (e.g. an unsupported proxy
/// scheme), before any network activity, or when the report cannot be written.
/// Per-host failures are not errors here; they end up in
/// [`RunOutcome::combined`].
pub async fn run<W: Write>(
    config: &Config,
    writer: &mut W,
    cancel: &CancellationToken,
) -> Result<RunOutcome> {
    run_with_env(config, ProxyEnv::from_env(), writer, cancel).await
}

/// Like [`run`], with explicit proxy environment settings.
pub async fn run_with_env<W: Write>(
    config: &Config,
    env: ProxyEnv,
    writer: &mut W,
    cancel: &CancellationToken,
) -> Result<RunOutcome> {
    let policy = resolve_policy(config.no_proxy, config.proxy.as_deref().unwrap_or_default())
        .context("Invalid proxy configuration")?;
    let opts = config.fetch_options();
    let targets = parse_targets(&config.hosts, opts.default_port);
    let fetcher = CertFetcher::new(policy, env, opts)?;

    let start = Instant::now();
    let mut errors = ErrorAccumulator::new();
    let results = fetcher.fetch_all(&targets, cancel, &mut errors).await;
    log_summary(targets.len(), results.len(), start.elapsed());

    write_report(writer, config.output, &results)?;
    check_expiration(config.threshold, &results, Utc::now(), &mut errors);

    Ok(RunOutcome {
        results,
        combined: errors.merge_and_clear(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_policy_error_aborts_before_dialing() {
        let config = Config::try_parse_from([
            "certinfo",
            "--proxy",
            "ftp://proxy.example:21",
            "example.com",
        ])
        .unwrap();
        let mut out = Vec::new();
        let err = run_with_env(&config, ProxyEnv::none(), &mut out, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("unsupported proxy scheme"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_failed_host_sets_exit_code() {
        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let target = format!("127.0.0.1:{port}");
        let config =
            Config::try_parse_from(["certinfo", "--no-proxy", "-o", "json", target.as_str()])
                .unwrap();
        let mut out = Vec::new();
        let outcome = run_with_env(&config, ProxyEnv::none(), &mut out, &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.exit_code(), 1);
        let combined = outcome.combined.unwrap();
        assert_eq!(combined.len(), 1);
        assert!(combined.to_string().contains(&target));
        assert_eq!(String::from_utf8(out).unwrap(), "[]\n");
    }
}
