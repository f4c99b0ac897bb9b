//! Graceful shutdown handling.

use log::warn;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` when the process receives Ctrl-C.
///
/// The host in flight is reported as cancelled and the remaining hosts are
/// skipped, so the accumulated errors are still printed on the way out.
pub fn cancel_on_ctrl_c(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => warn!("Interrupted, cancelling remaining work"),
                    Err(e) => {
                        warn!("Failed to listen for Ctrl-C: {e}");
                        return;
                    }
                }
                cancel.cancel();
            }
            _ = cancel.cancelled() => {}
        }
    })
}
