//! Lenient parsing of upstream `dataHora` values into sort keys.
//!
//! The Chamber API usually sends minute precision without seconds
//! (`2023-05-10T14:30`), but older records and placeholder strings show up
//! too. Anything that is not a recognisable date yields `None`, which the
//! report sorts after every valid timestamp.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse a last-action timestamp.
///
/// Offsets are dropped (the local wall-clock time is kept), and a bare date
/// means midnight.
pub fn parse_last_action(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Seconds since the Unix epoch, treating the wall-clock time as UTC.
pub fn epoch_seconds(dt: &NaiveDateTime) -> i64 {
    dt.and_utc().timestamp()
}
