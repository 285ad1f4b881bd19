//! Time-series synchronizer: loads day partitions on demand and tracks the
//! current slice while the user navigates through time.
//!
//! Partitions are keyed by local calendar date. Navigation targets are
//! computed on naive wall-clock timestamps, so a step across midnight always
//! lands on the next day's partition regardless of the host time zone.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use tracing::{debug, info, instrument, warn};

use currents_common::time::{date_key_of, local_date_key, offset_by_minutes};
use currents_common::{CurrentsError, CurrentsResult, TimeSlice};

use crate::catalog::Catalog;
use crate::object_store::PartitionSource;
use crate::series::Series;

/// Result of asking for a date's partition.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The date has no entry in the index.
    NotIndexed,
    /// The partition was merged earlier; nothing was fetched.
    AlreadyLoaded,
    /// Freshly fetched slices, not yet merged.
    Loaded(Vec<TimeSlice>),
}

/// Whether a navigation step selected a different slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved { index: usize, date: String },
    Unchanged,
}

/// Outcome of [`SeriesSynchronizer::advance`].
#[derive(Debug)]
pub struct Advance {
    pub navigation: Navigation,
    /// Partition load failure encountered on the way, for status reporting.
    pub load_error: Option<CurrentsError>,
}

impl Advance {
    fn unchanged() -> Self {
        Self {
            navigation: Navigation::Unchanged,
            load_error: None,
        }
    }

    pub fn moved(&self) -> bool {
        matches!(self.navigation, Navigation::Moved { .. })
    }
}

/// Owns the catalog, the loaded-date set, the series and the current index.
pub struct SeriesSynchronizer {
    source: Arc<dyn PartitionSource>,
    catalog: Option<Catalog>,
    loaded: HashSet<String>,
    series: Series,
    current: usize,
}

impl SeriesSynchronizer {
    pub fn new(source: Arc<dyn PartitionSource>) -> Self {
        Self {
            source,
            catalog: None,
            loaded: HashSet::new(),
            series: Series::new(),
            current: 0,
        }
    }

    /// Load the date index and station list. Must complete before any load.
    pub async fn bootstrap_catalog(&mut self) -> CurrentsResult<&Catalog> {
        let catalog = Catalog::load(self.source.as_ref()).await?;
        Ok(self.catalog.insert(catalog))
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slice(&self) -> Option<&TimeSlice> {
        self.series.get(self.current)
    }

    pub fn is_loaded(&self, date_key: &str) -> bool {
        self.loaded.contains(date_key)
    }

    /// Fetch the partition for the calendar date of `date`.
    ///
    /// The date key is the first token of the string (`"2024-03-01 12:00"`
    /// and `"2024-03-01T12:00"` both map to `2024-03-01`). On success the key
    /// is marked loaded; the caller merges the returned slices.
    #[instrument(skip(self))]
    pub async fn load_for_date(&mut self, date: &str) -> CurrentsResult<LoadOutcome> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| CurrentsError::IndexMissing("date index and stations".into()))?;

        let key = date_key_of(date).to_string();
        let Some(file) = catalog.index.file_for(&key) else {
            warn!(date_key = %key, "No data found for date");
            return Ok(LoadOutcome::NotIndexed);
        };
        if self.loaded.contains(&key) {
            debug!(date_key = %key, "Partition already loaded");
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let start = Instant::now();
        let bytes = match self.source.fetch(file).await {
            Ok(bytes) => bytes,
            Err(e) => {
                metrics::counter!("partition_load_failures").increment(1);
                return Err(e);
            }
        };
        let slices = catalog.parse_partition(file, &bytes).inspect_err(|_| {
            metrics::counter!("partition_load_failures").increment(1);
        })?;

        self.loaded.insert(key.clone());
        metrics::counter!("partition_loads").increment(1);
        metrics::histogram!("partition_load_seconds").record(start.elapsed().as_secs_f64());
        info!(date_key = %key, file = %file, slices = slices.len(), "Loaded partition");

        Ok(LoadOutcome::Loaded(slices))
    }

    /// Merge slices into the series (append, then full re-sort).
    pub fn merge(&mut self, slices: Vec<TimeSlice>) -> usize {
        let added = slices.len();
        let total = self.series.merge(slices);
        debug!(added, total, "Merged slices");
        total
    }

    /// Index of the slice nearest to `target`; ties go to the earliest.
    pub fn closest_index(&self, target: NaiveDateTime) -> Option<usize> {
        self.series.closest_index(target)
    }

    /// Choose and load the starting partition, then select the slice nearest `now`.
    ///
    /// The start key is `requested` if given, else today's key when indexed,
    /// else the earliest indexed key. A start partition that yields no slices
    /// is fatal.
    #[instrument(skip(self))]
    pub async fn start(
        &mut self,
        requested: Option<&str>,
        now: NaiveDateTime,
    ) -> CurrentsResult<&TimeSlice> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| CurrentsError::IndexMissing("date index and stations".into()))?;

        let today = local_date_key(now);
        let start_key = match requested.filter(|r| !r.trim().is_empty()) {
            Some(requested) => date_key_of(requested.trim()).to_string(),
            None if catalog.index.contains(&today) => today,
            None => catalog
                .index
                .earliest_key()
                .map(str::to_string)
                .unwrap_or(today),
        };

        match self.load_for_date(&start_key).await? {
            LoadOutcome::Loaded(slices) if !slices.is_empty() => {
                self.merge(slices);
            }
            _ => {
                return Err(CurrentsError::data_load(
                    start_key,
                    "Initial data load failed or empty",
                ))
            }
        }

        self.current = self.closest_index(now).unwrap_or(0);
        let slice = self
            .series
            .get(self.current)
            .ok_or_else(|| CurrentsError::data_load(start_key.as_str(), "no slices"))?;
        info!(date = %slice.date, "Starting at slice");
        Ok(slice)
    }

    /// Move the current slice by a signed number of minutes.
    ///
    /// Loads the target's calendar-date partition first when it is indexed
    /// but not yet loaded. A failed load does not stop navigation: the
    /// nearest slice among what is already loaded is selected and the error
    /// is returned alongside. An empty series makes this a no-op.
    #[instrument(skip(self))]
    pub async fn advance(&mut self, offset_minutes: i64) -> Advance {
        let Some(current) = self.current_slice() else {
            return Advance::unchanged();
        };
        let target = offset_by_minutes(current.timestamp, offset_minutes);
        let key = local_date_key(target);

        let needs_load = !self.loaded.contains(&key)
            && self
                .catalog
                .as_ref()
                .is_some_and(|c| c.index.contains(&key));

        let mut load_error = None;
        if needs_load {
            match self.load_for_date(&key).await {
                Ok(LoadOutcome::Loaded(slices)) => {
                    self.merge(slices);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(date_key = %key, error = %e, "Failed to load data");
                    load_error = Some(e);
                }
            }
        }

        let Some(closest) = self.closest_index(target) else {
            return Advance {
                navigation: Navigation::Unchanged,
                load_error,
            };
        };

        let navigation = if closest != self.current || needs_load {
            self.current = closest;
            let date = self
                .series
                .get(closest)
                .map(|s| s.date.clone())
                .unwrap_or_default();
            info!(date = %date, "Updating time");
            Navigation::Moved {
                index: closest,
                date,
            }
        } else {
            debug!(target = %target, "No new data found for target time");
            Navigation::Unchanged
        };

        Advance {
            navigation,
            load_error,
        }
    }
}
