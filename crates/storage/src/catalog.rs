//! Date index and station catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use currents_common::{CurrentsError, CurrentsResult, Station, TimeSlice};

use crate::object_store::PartitionSource;

/// Name of the date index resource.
pub const INDEX_FILE: &str = "index.json";

/// Name of the station list resource.
pub const STATIONS_FILE: &str = "stations.json";

/// Mapping from `YYYY-MM-DD` to partition file name. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateIndex(BTreeMap<String, String>);

impl DateIndex {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    /// Partition file for a date key.
    pub fn file_for(&self, date_key: &str) -> Option<&str> {
        self.0.get(date_key).map(String::as_str)
    }

    pub fn contains(&self, date_key: &str) -> bool {
        self.0.contains_key(date_key)
    }

    /// Lexicographically smallest key, which is also the earliest date.
    pub fn earliest_key(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One entry of a partition file: a timestamp and readings in station order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionRow {
    pub date: String,
    pub samples: Vec<Value>,
}

/// Date index plus the station list. Immutable after bootstrap.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub index: DateIndex,
    pub stations: Vec<Arc<Station>>,
}

impl Catalog {
    /// Load the date index and the station list concurrently.
    #[instrument(skip(source), fields(base = %source.describe()))]
    pub async fn load(source: &dyn PartitionSource) -> CurrentsResult<Self> {
        let (index_bytes, station_bytes) =
            futures::try_join!(source.fetch(INDEX_FILE), source.fetch(STATIONS_FILE))?;

        let index: DateIndex = serde_json::from_slice(&index_bytes)
            .map_err(|e| CurrentsError::data_load(INDEX_FILE, e.to_string()))?;
        let stations: Vec<Station> = serde_json::from_slice(&station_bytes)
            .map_err(|e| CurrentsError::data_load(STATIONS_FILE, e.to_string()))?;

        info!(
            dates = index.len(),
            stations = stations.len(),
            "Catalog loaded"
        );

        Ok(Self {
            index,
            stations: stations.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse a partition file and zip every row against station order.
    pub fn parse_partition(&self, file: &str, bytes: &[u8]) -> CurrentsResult<Vec<TimeSlice>> {
        let rows: Vec<PartitionRow> = serde_json::from_slice(bytes)
            .map_err(|e| CurrentsError::data_load(file, e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                TimeSlice::assemble(row.date, &row.samples, &self.stations).map_err(|e| {
                    CurrentsError::data_load(file, e.to_string())
                })
            })
            .collect()
    }
}
