use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone};
use tracing::warn;

use crate::error::ValidationError;

/// Parse a `HH:MM` time of day.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| ValidationError::TimeOfDay(raw.to_string()))
}

/// Today's occurrence of `time` if it is still ahead of `now`, otherwise
/// tomorrow's.
pub fn next_occurrence<Tz: TimeZone>(time: NaiveTime, now: &DateTime<Tz>) -> DateTime<Tz> {
    let today = now.date_naive();
    let candidate = at_local(&now.timezone(), today, time);
    if candidate <= *now {
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        at_local(&now.timezone(), tomorrow, time)
    } else {
        candidate
    }
}

/// How long to wait before firing a reminder for `time`, `early` ahead of
/// its next occurrence.
///
/// Returns `None` (and logs) when the delay is zero or negative; such a
/// reminder is simply not armed.
pub fn trigger_delay<Tz: TimeZone>(
    time: NaiveTime,
    now: &DateTime<Tz>,
    early: Duration,
) -> Option<Duration> {
    let until = next_occurrence(time, now)
        .signed_duration_since(now.clone())
        .num_milliseconds();
    let ms = until - early.as_millis() as i64;
    if ms <= 0 {
        warn!(%time, delay_ms = ms, "reminder delay not positive; not arming");
        return None;
    }
    Some(Duration::from_millis(ms as u64))
}

/// Resolve a wall-clock date and time in `tz`. Ambiguous times take the
/// earlier instant; times skipped by a DST jump are read as UTC offsets of
/// the same wall clock.
fn at_local<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
