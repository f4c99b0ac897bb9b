//! Run summary logging.

use std::time::Duration;

use log::{info, warn};

/// Logs how many hosts were harvested out of how many were attempted.
pub fn log_summary(attempted: usize, harvested: usize, elapsed: Duration) {
    let failed = attempted.saturating_sub(harvested);
    let elapsed_secs = elapsed.as_secs_f64();
    if failed == 0 {
        info!(
            "Fetched certificates from {} host{} in {:.2} seconds",
            harvested,
            if harvested == 1 { "" } else { "s" },
            elapsed_secs
        );
    } else {
        warn!(
            "Fetched certificates from {harvested} of {attempted} hosts in {elapsed_secs:.2} seconds ({failed} failed)"
        );
    }
}
