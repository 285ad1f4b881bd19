//! Test data generators for synthetic stations, partitions and masks.
//!
//! These generators create predictable, verifiable patterns that can be used
//! across the test suite.

use chrono::{Duration, NaiveDate};
use currents_common::Station;
use serde_json::{json, Value};

/// Six stations spread over New York harbor.
///
/// Station `A` sits at (-74.0, 40.7); the others are named `B`..`F`.
pub fn harbor_stations() -> Vec<Station> {
    vec![
        Station::new("A", -74.0, 40.7),
        Station::new("B", -74.2, 40.5),
        Station::new("C", -73.8, 40.5),
        Station::new("D", -74.2, 40.8),
        Station::new("E", -73.8, 40.8),
        Station::new("F", -74.05, 40.6),
    ]
}

/// Rows at 15-minute steps starting at midnight of `date_key`.
///
/// Every reading is produced by `reading(slice_index, station_index)`.
/// Timestamps are written as `YYYY-MM-DD HH:MM:SS`.
pub fn rows_with<F>(date_key: &str, count: usize, stations: usize, reading: F) -> Vec<(String, Vec<Value>)>
where
    F: Fn(usize, usize) -> Value,
{
    let midnight = NaiveDate::parse_from_str(date_key, "%Y-%m-%d")
        .expect("valid date key")
        .and_hms_opt(0, 0, 0)
        .expect("valid midnight");

    (0..count)
        .map(|i| {
            let t = midnight + Duration::minutes(15 * i as i64);
            let samples = (0..stations).map(|s| reading(i, s)).collect();
            (t.format("%Y-%m-%d %H:%M:%S").to_string(), samples)
        })
        .collect()
}

/// Rows where every station reads `[90, 2.0]` (due east at 2 knots).
pub fn quarter_hour_rows(date_key: &str, count: usize, stations: usize) -> Vec<(String, Vec<Value>)> {
    rows_with(date_key, count, stations, |_, _| json!([90, 2.0]))
}

/// A whole day (96 slices) of uniform readings.
pub fn full_day_rows(date_key: &str, stations: usize) -> Vec<(String, Vec<Value>)> {
    quarter_hour_rows(date_key, 96, stations)
}

/// Row-major flags, true everywhere.
pub fn open_water_mask(width: usize, height: usize) -> Vec<bool> {
    vec![true; width * height]
}

/// Row-major flags, true inside the half-open rectangle `[x0, x1) x [y0, y1)`.
pub fn rect_mask(width: usize, height: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> Vec<bool> {
    let mut flags = vec![false; width * height];
    for y in y0..y1.min(height) {
        for x in x0..x1.min(width) {
            flags[y * width + x] = true;
        }
    }
    flags
}

/// Open water with a vertical land barrier `thickness` pixels wide at `wall_x`.
pub fn wall_mask(width: usize, height: usize, wall_x: usize, thickness: usize) -> Vec<bool> {
    let mut flags = open_water_mask(width, height);
    for y in 0..height {
        for x in wall_x..(wall_x + thickness).min(width) {
            flags[y * width + x] = false;
        }
    }
    flags
}
