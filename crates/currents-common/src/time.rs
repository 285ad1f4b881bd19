//! Wall-clock time handling for partitioned current data.
//!
//! Slice timestamps are partition-local wall-clock times. Partitions are
//! named after the local calendar date, so every calendar computation here
//! stays on naive wall-clock values and never converts through UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use crate::error::{CurrentsError, CurrentsResult};

/// Format used for date index keys and partition names.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Parse a slice timestamp into its wall-clock value.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM[:SS]` and a
/// bare date (midnight). A fixed offset, when present, is dropped after
/// taking the local time it annotates.
pub fn parse_wall_clock(s: &str) -> CurrentsResult<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt.naive_local());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ndt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_KEY_FORMAT) {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(ndt);
        }
    }

    Err(CurrentsError::InvalidTime(s.to_string()))
}

/// Extract the calendar-date key from a date or timestamp string.
///
/// `"2024-03-01 12:00:00"` and `"2024-03-01T12:00"` both yield `"2024-03-01"`.
pub fn date_key_of(date: &str) -> &str {
    let first = date.split(' ').next().unwrap_or(date);
    first.split('T').next().unwrap_or(first)
}

/// Local calendar-date key of a wall-clock timestamp.
pub fn local_date_key(t: NaiveDateTime) -> String {
    t.date().format(DATE_KEY_FORMAT).to_string()
}

/// Shift a wall-clock timestamp by a signed number of minutes.
pub fn offset_by_minutes(t: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    t + Duration::minutes(minutes)
}

/// Absolute distance between two wall-clock timestamps in milliseconds.
pub fn abs_diff_millis(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (a - b).num_milliseconds().abs()
}

/// Strip a `:SS±HH:MM` seconds-and-offset suffix from a display timestamp.
///
/// The field grid reflects a single canonical slice, so the embedded
/// fixed offset carries no information for display. Strings without such a
/// suffix are returned unchanged.
pub fn strip_fixed_offset(date: &str) -> String {
    let bytes = date.as_bytes();
    if bytes.len() < 9 {
        return date.to_string();
    }
    let tail = &bytes[bytes.len() - 9..];
    let is_digit = |b: u8| b.is_ascii_digit();
    let matches = tail[0] == b':'
        && is_digit(tail[1])
        && is_digit(tail[2])
        && (tail[3] == b'+' || tail[3] == b'-')
        && is_digit(tail[4])
        && is_digit(tail[5])
        && tail[6] == b':'
        && is_digit(tail[7])
        && is_digit(tail[8]);

    if matches {
        date[..date.len() - 9].to_string()
    } else {
        date.to_string()
    }
}
