use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, TrackerError};

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Parse an ISO 8601 / RFC 3339 timestamp, keeping its embedded offset.
///
/// Handles `Z` and `±HH:MM` suffixes with or without fractional seconds.
/// A timestamp without any offset is taken to be UTC. Empty or unparseable
/// strings log a warning and return `None`.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    // ISO variants RFC 3339 rejects: minute precision, compact offsets.
    const OFFSET_FMTS: &[&str] = &[
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
    ];
    for fmt in OFFSET_FMTS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    const NAIVE_FMTS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in NAIVE_FMTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    warn!("Could not parse timestamp: \"{}\"", s);
    None
}

/// Parse an epoch-milliseconds value, given either as a JSON number or a
/// numeric string. The result carries a UTC offset.
pub fn parse_epoch_millis(value: &Value) -> Option<DateTime<FixedOffset>> {
    let millis = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let Some(millis) = millis else {
        warn!("Could not parse epoch milliseconds: {}", value);
        return None;
    };
    let dt = DateTime::<Utc>::from_timestamp_millis(millis);
    if dt.is_none() {
        warn!("Epoch milliseconds out of range: {}", millis);
    }
    dt.map(|d| d.fixed_offset())
}

/// Parse a JSON value holding an ISO timestamp string.
///
/// `null` and absent values return `None` silently.
pub fn parse_timestamp_value(value: Option<&Value>) -> Option<DateTime<FixedOffset>> {
    match value? {
        Value::Null => None,
        Value::String(s) => parse_timestamp(s),
        other => {
            warn!("Could not parse timestamp: {}", other);
            None
        }
    }
}

// ── Local-time helpers ────────────────────────────────────────────────────────

/// `true` when the wall-clock time of `dt` (in its own offset) is strictly
/// before `hour:00`.
pub fn local_time_before(dt: &DateTime<FixedOffset>, hour: u32) -> bool {
    match NaiveTime::from_hms_opt(hour, 0, 0) {
        Some(cutoff) => dt.time() < cutoff,
        None => true,
    }
}

/// Absolute gap between two instants in whole-and-fractional seconds.
pub fn abs_seconds_between(a: &DateTime<FixedOffset>, b: &DateTime<FixedOffset>) -> f64 {
    let delta = *a - *b;
    (delta.num_milliseconds() as f64 / 1000.0).abs()
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| TrackerError::InvalidDate(format!("{s}: {e}; expected YYYY-MM-DD")))
}

/// Every date from `start` to `end`, both inclusive. Empty when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}
