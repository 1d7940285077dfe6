//! Time calculations for sync cycles.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::server::error::Error;

/// Calculates the start of the sync cycle containing `now`.
///
/// Balance snapshots are stamped with the cycle start rather than the wall clock, so any
/// re-run of a sync inside the same cycle produces the same (account, observation time)
/// key and is deduplicated by the store.
///
/// # Arguments
/// - `now` - Current UTC timestamp
/// - `cycle` - Cycle length; anything under one second is treated as one second
///
/// # Returns
/// - `Ok(NaiveDateTime)` - Cycle start, aligned to the Unix epoch
/// - `Err(Error::ParseError)` - The aligned timestamp is out of range
///
/// # Example
/// ```ignore
/// // 12:07:31 with a 5 minute cycle belongs to the cycle starting 12:05:00
/// let start = cycle_start(Utc.with_ymd_and_hms(2026, 2, 1, 12, 7, 31).unwrap(), Duration::from_secs(300))?;
/// ```
pub fn cycle_start(now: DateTime<Utc>, cycle: Duration) -> Result<NaiveDateTime, Error> {
    let cycle_secs = cycle.as_secs().max(1) as i64;
    let timestamp = now.timestamp();
    let start = timestamp - timestamp.rem_euclid(cycle_secs);

    DateTime::from_timestamp(start, 0)
        .map(|start| start.naive_utc())
        .ok_or_else(|| Error::ParseError(format!("Sync cycle start {start} is out of range")))
}
