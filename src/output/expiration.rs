//! Expiration warnings.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use log::debug;

use crate::error_handling::{ErrorAccumulator, ExpirationWarning};
use crate::models::HostResult;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Pushes an [`ExpirationWarning`] for every certificate whose `not_after`
/// falls before `now + threshold`. A zero threshold disables the check.
///
/// Returns the number of warnings pushed.
pub fn check_expiration(
    threshold: Duration,
    results: &[HostResult],
    now: DateTime<Utc>,
    errors: &mut ErrorAccumulator,
) -> usize {
    if threshold.is_zero() {
        return 0;
    }
    let deadline = TimeDelta::from_std(threshold)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let mut pushed = 0;
    for cert in results.iter().flat_map(|r| &r.certificates) {
        if deadline > cert.not_after {
            let days = (cert.not_after - now).num_milliseconds() as f64 / MILLIS_PER_DAY;
            errors.push(ExpirationWarning {
                subject: cert.subject_common_name.clone(),
                days,
                not_after: cert.not_after.to_rfc3339_opts(SecondsFormat::Secs, true),
            });
            pushed += 1;
        }
    }
    debug!("Expiration check pushed {pushed} warning(s)");
    pushed
}
