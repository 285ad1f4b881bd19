//! Stations, samples and time slices.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CurrentsResult;
use crate::time::parse_wall_clock;

/// A current measurement station. Loaded once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Opaque identifier (NOAA station ids are strings, some feeds use numbers).
    #[serde(deserialize_with = "string_or_number")]
    pub station_id: String,
    /// `[longitude, latitude]` in degrees.
    pub coordinates: [f64; 2],
}

impl Station {
    pub fn new(station_id: impl Into<String>, lng: f64, lat: f64) -> Self {
        Self {
            station_id: station_id.into(),
            coordinates: [lng, lat],
        }
    }

    pub fn lng(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number station id, got {}",
            other
        ))),
    }
}

/// One station's reading within a time slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub station: Arc<Station>,
    /// `[direction_degrees, speed]`, or `None` when the reading is missing.
    pub current: Option<[f64; 2]>,
}

impl Sample {
    pub fn station_id(&self) -> &str {
        &self.station.station_id
    }

    pub fn coordinates(&self) -> [f64; 2] {
        self.station.coordinates
    }

    /// The reading, only when both direction and speed are finite numbers.
    pub fn valid_current(&self) -> Option<[f64; 2]> {
        self.current
            .filter(|[direction, speed]| direction.is_finite() && speed.is_finite())
    }
}

/// Interpret one entry of a partition row as a `[direction, speed]` pair.
///
/// `null`, short arrays and non-numeric entries are missing readings.
/// Numeric strings are accepted.
pub fn reading_from_value(value: &Value) -> Option<[f64; 2]> {
    let items = value.as_array()?;
    if items.len() < 2 {
        return None;
    }
    let number = |v: &Value| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Some([number(&items[0])?, number(&items[1])?])
}

/// One timestamped snapshot of all station readings. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlice {
    /// Timestamp exactly as written in the partition.
    pub date: String,
    /// Parsed wall-clock timestamp used for ordering and navigation.
    pub timestamp: NaiveDateTime,
    /// Samples aligned with station order.
    pub samples: Vec<Sample>,
}

impl TimeSlice {
    /// Zip a partition row against station order.
    ///
    /// Row positions without a matching station are dropped; they do not fail
    /// the slice.
    pub fn assemble(
        date: impl Into<String>,
        readings: &[Value],
        stations: &[Arc<Station>],
    ) -> CurrentsResult<Self> {
        let date = date.into();
        let timestamp = parse_wall_clock(&date)?;
        let samples = readings
            .iter()
            .enumerate()
            .filter_map(|(i, value)| {
                stations.get(i).map(|station| Sample {
                    station: Arc::clone(station),
                    current: reading_from_value(value),
                })
            })
            .collect();

        Ok(Self {
            date,
            timestamp,
            samples,
        })
    }

    /// Number of samples with a usable current reading.
    pub fn valid_count(&self) -> usize {
        self.samples
            .iter()
            .filter(|s| s.valid_current().is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stations() -> Vec<Arc<Station>> {
        vec![
            Arc::new(Station::new("A", -74.0, 40.7)),
            Arc::new(Station::new("B", -74.1, 40.6)),
        ]
    }

    #[test]
    fn test_station_deserialize_numeric_id() {
        let station: Station =
            serde_json::from_value(json!({"stationId": 8518750, "coordinates": [-74.0, 40.7]}))
                .unwrap();
        assert_eq!(station.station_id, "8518750");
        assert_eq!(station.lng(), -74.0);
    }

    #[test]
    fn test_reading_from_value() {
        assert_eq!(reading_from_value(&json!([90, 2.0])), Some([90.0, 2.0]));
        assert_eq!(reading_from_value(&json!(["45", "1.5"])), Some([45.0, 1.5]));
        assert_eq!(reading_from_value(&json!(null)), None);
        assert_eq!(reading_from_value(&json!([90])), None);
        assert_eq!(reading_from_value(&json!([90, "fast"])), None);
    }

    #[test]
    fn test_assemble_drops_rows_without_station() {
        let readings = vec![json!([90, 2.0]), json!(null), json!([10, 1.0])];
        let slice = TimeSlice::assemble("2024-03-01 00:00:00", &readings, &stations()).unwrap();
        assert_eq!(slice.samples.len(), 2);
        assert_eq!(slice.samples[0].station_id(), "A");
        assert_eq!(slice.samples[0].current, Some([90.0, 2.0]));
        assert_eq!(slice.samples[1].current, None);
        assert_eq!(slice.valid_count(), 1);
    }

    #[test]
    fn test_nan_reading_is_not_valid() {
        let sample = Sample {
            station: stations()[0].clone(),
            current: Some([f64::NAN, 1.0]),
        };
        assert!(sample.valid_current().is_none());
    }
}
