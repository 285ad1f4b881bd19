//! Common test fixtures for tidal-currents tests.
//!
//! This module provides pre-defined test data and a builder that lays out a
//! partitioned data directory the way the viewer expects to find it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use currents_common::Station;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Common bounding box definitions for testing, as `(min_lng, min_lat, max_lng, max_lat)`.
pub mod bbox {
    /// New York harbor
    pub const HARBOR: (f64, f64, f64, f64) = (-74.3, 40.4, -73.7, 40.9);

    /// A one-degree square
    pub const UNIT_SQUARE: (f64, f64, f64, f64) = (-74.0, 40.0, -73.0, 41.0);
}

/// Common time values for testing.
pub mod time {
    /// First indexed day of the standard fixture
    pub const DAY_ONE: &str = "2024-03-01";

    /// Second indexed day of the standard fixture
    pub const DAY_TWO: &str = "2024-03-02";

    /// Slice spacing written by the partition generator
    pub const STEP_MINUTES: i64 = 15;
}

/// A partitioned data directory inside a temp dir.
///
/// Files are written as they are added; `index.json` is rewritten on every
/// change so the directory is always consistent.
pub struct DataDir {
    dir: TempDir,
    index: BTreeMap<String, String>,
}

impl DataDir {
    /// Create an empty data directory with the given stations.
    pub fn new(stations: &[Station]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut data = Self {
            dir,
            index: BTreeMap::new(),
        };
        data.write_json(
            "stations.json",
            &serde_json::to_value(stations).expect("serialize stations"),
        );
        data.write_index();
        data
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path as a string, suitable for a source config.
    pub fn base(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    /// Write a partition `<date_key>.json` and index it.
    pub fn add_partition(&mut self, date_key: &str, rows: &[(String, Vec<Value>)]) -> &mut Self {
        let file = format!("{}.json", date_key);
        let body: Vec<Value> = rows
            .iter()
            .map(|(date, samples)| json!({"date": date, "samples": samples}))
            .collect();
        self.write_json(&file, &Value::Array(body));
        self.index.insert(date_key.to_string(), file);
        self.write_index();
        self
    }

    /// Index a date whose partition file does not exist.
    pub fn add_missing_partition(&mut self, date_key: &str) -> &mut Self {
        self.index
            .insert(date_key.to_string(), format!("{}-missing.json", date_key));
        self.write_index();
        self
    }

    /// Write an arbitrary file into the directory.
    pub fn write_raw(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    fn write_index(&self) {
        let index: serde_json::Map<String, Value> = self
            .index
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        self.write_json("index.json", &Value::Object(index));
    }

    fn write_json(&self, name: &str, value: &Value) {
        let body = serde_json::to_string_pretty(value).expect("serialize fixture");
        self.write_raw(name, &body);
    }
}

/// A simple rectangular boundary polygon as GeoJSON.
pub fn rectangle_geojson(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> String {
    json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [min_lng, min_lat],
                [max_lng, min_lat],
                [max_lng, max_lat],
                [min_lng, max_lat],
                [min_lng, min_lat]
            ]]
        }
    })
    .to_string()
}
