//! Synchronizer tests against partitioned data directories on disk.

use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDateTime;
use object_store::{memory::InMemory, path::Path, ObjectStore};
use serde_json::json;

use currents_common::{parse_wall_clock, CurrentsError};
use storage::{
    LoadOutcome, Navigation, ObjectStoreSource, PartitionSource, SeriesSynchronizer, SourceConfig,
};
use test_utils::{full_day_rows, harbor_stations, rows_with, time, DataDir};

fn at(s: &str) -> NaiveDateTime {
    parse_wall_clock(s).unwrap()
}

fn two_day_dir() -> DataDir {
    let stations = harbor_stations();
    let mut data = DataDir::new(&stations);
    data.add_partition(time::DAY_ONE, &full_day_rows(time::DAY_ONE, stations.len()));
    data.add_partition(time::DAY_TWO, &full_day_rows(time::DAY_TWO, stations.len()));
    data
}

fn synchronizer(data: &DataDir) -> SeriesSynchronizer {
    let source = ObjectStoreSource::new(&SourceConfig::new(data.base())).unwrap();
    SeriesSynchronizer::new(Arc::new(source))
}

// ============================================================================
// load_for_date
// ============================================================================

#[tokio::test]
async fn test_load_before_bootstrap_is_index_missing() {
    let data = two_day_dir();
    let mut sync = synchronizer(&data);
    let err = sync.load_for_date("2024-03-01").await.unwrap_err();
    assert!(matches!(err, CurrentsError::IndexMissing(_)));
}

#[tokio::test]
async fn test_load_outcomes() {
    let data = two_day_dir();
    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();

    assert!(matches!(
        sync.load_for_date("2024-04-01").await.unwrap(),
        LoadOutcome::NotIndexed
    ));

    match sync.load_for_date("2024-03-01T12:00").await.unwrap() {
        LoadOutcome::Loaded(slices) => {
            assert_eq!(slices.len(), 96);
            assert_eq!(slices[0].samples.len(), 6);
        }
        other => panic!("expected Loaded, got {:?}", other),
    }
    assert!(sync.is_loaded("2024-03-01"));

    assert!(matches!(
        sync.load_for_date("2024-03-01 08:00:00").await.unwrap(),
        LoadOutcome::AlreadyLoaded
    ));
}

#[tokio::test]
async fn test_failed_load_leaves_date_unloaded() {
    let stations = harbor_stations();
    let mut data = DataDir::new(&stations);
    data.add_missing_partition(time::DAY_ONE);
    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();

    let err = sync.load_for_date(time::DAY_ONE).await.unwrap_err();
    assert!(err.is_recoverable());
    assert!(!sync.is_loaded(time::DAY_ONE));
}

#[tokio::test]
async fn test_merge_is_idempotent_per_date() {
    let data = two_day_dir();
    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();

    for _ in 0..3 {
        if let LoadOutcome::Loaded(slices) = sync.load_for_date(time::DAY_ONE).await.unwrap() {
            sync.merge(slices);
        }
    }
    assert_eq!(sync.series().len(), 96);
}

// ============================================================================
// start
// ============================================================================

#[tokio::test]
async fn test_start_picks_slice_nearest_now() {
    let data = two_day_dir();
    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();

    let slice = sync
        .start(Some("2024-03-01"), at("2024-03-01 12:07:00"))
        .await
        .unwrap();
    assert_eq!(slice.date, "2024-03-01 12:00:00");
    assert_eq!(sync.series().len(), 96);
}

#[tokio::test]
async fn test_start_defaults_to_today_then_earliest() {
    let data = two_day_dir();

    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();
    let slice = sync.start(None, at("2024-03-02 06:00:00")).await.unwrap();
    assert_eq!(slice.date, "2024-03-02 06:00:00");

    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();
    let slice = sync.start(None, at("2025-01-01 06:00:00")).await.unwrap();
    // Earliest partition; `now` is far after it, so the last slice wins.
    assert_eq!(slice.date, "2024-03-01 23:45:00");
}

#[tokio::test]
async fn test_start_on_unindexed_date_fails() {
    let data = two_day_dir();
    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();
    let err = sync
        .start(Some("2023-01-01"), at("2023-01-01 00:00:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, CurrentsError::DataLoad { .. }));
}

// ============================================================================
// advance
// ============================================================================

#[tokio::test]
async fn test_advance_across_midnight_loads_next_partition() {
    let data = two_day_dir();
    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();
    sync.start(Some(time::DAY_ONE), at("2024-03-01 23:50:00"))
        .await
        .unwrap();
    assert_eq!(sync.current_slice().unwrap().date, "2024-03-01 23:45:00");

    let step = sync.advance(15).await;
    assert!(step.load_error.is_none());
    assert_eq!(
        step.navigation,
        Navigation::Moved {
            index: 96,
            date: "2024-03-02 00:00:00".to_string()
        }
    );
    assert!(sync.is_loaded(time::DAY_TWO));
    assert_eq!(sync.series().len(), 192);
    assert!(sync.series().is_sorted());

    let back = sync.advance(-15).await;
    assert!(back.moved());
    assert_eq!(sync.current_slice().unwrap().date, "2024-03-01 23:45:00");
    assert_eq!(sync.series().len(), 192);
}

#[tokio::test]
async fn test_advance_zero_is_unchanged() {
    let data = two_day_dir();
    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();
    sync.start(Some(time::DAY_ONE), at("2024-03-01 10:00:00"))
        .await
        .unwrap();

    let step = sync.advance(0).await;
    assert_eq!(step.navigation, Navigation::Unchanged);
    assert!(step.load_error.is_none());
}

#[tokio::test]
async fn test_advance_past_last_indexed_day_clamps() {
    let data = two_day_dir();
    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();
    sync.start(Some(time::DAY_ONE), at("2024-03-01 23:45:00"))
        .await
        .unwrap();

    // 2024-03-08 is not indexed: nothing to load, nearest slice is the last one loaded.
    let step = sync.advance(7 * 24 * 60).await;
    assert_eq!(step.navigation, Navigation::Unchanged);
    assert!(step.load_error.is_none());
}

#[tokio::test]
async fn test_advance_with_failed_load_still_navigates() {
    let stations = harbor_stations();
    let mut data = DataDir::new(&stations);
    data.add_partition(time::DAY_ONE, &full_day_rows(time::DAY_ONE, stations.len()));
    data.add_missing_partition(time::DAY_TWO);

    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();
    sync.start(Some(time::DAY_ONE), at("2024-03-01 12:00:00"))
        .await
        .unwrap();

    let step = sync.advance(24 * 60).await;
    assert!(matches!(step.load_error, Some(CurrentsError::DataLoad { .. })));
    // The load was attempted, so navigation reports a move to the nearest slice.
    assert!(step.moved());
    assert_eq!(sync.current_slice().unwrap().date, "2024-03-01 23:45:00");
    assert!(!sync.is_loaded(time::DAY_TWO));

    // Not marked loaded, so the next attempt fetches again.
    let retry = sync.advance(15).await;
    assert!(retry.load_error.is_some());
}

#[tokio::test]
async fn test_advance_on_empty_series_is_noop() {
    let data = two_day_dir();
    let mut sync = synchronizer(&data);
    sync.bootstrap_catalog().await.unwrap();
    let step = sync.advance(15).await;
    assert_eq!(step.navigation, Navigation::Unchanged);
    assert!(sync.series().is_empty());
}

// ============================================================================
// Sources
// ============================================================================

#[tokio::test]
async fn test_in_memory_source_with_sparse_rows() {
    let store = Arc::new(InMemory::new());
    let stations = json!([
        {"stationId": "A", "coordinates": [-74.0, 40.7]},
        {"stationId": "B", "coordinates": [-74.1, 40.6]}
    ]);
    let rows = rows_with(time::DAY_ONE, 2, 3, |i, _| {
        if i == 0 {
            json!(null)
        } else {
            json!([180, "1.5"])
        }
    });
    let partition: Vec<_> = rows
        .iter()
        .map(|(date, samples)| json!({"date": date, "samples": samples}))
        .collect();

    for (name, body) in [
        ("index.json", json!({"2024-03-01": "2024-03-01.json"})),
        ("stations.json", stations),
        ("2024-03-01.json", json!(partition)),
    ] {
        store
            .put(&Path::from(name), Bytes::from(body.to_string()).into())
            .await
            .unwrap();
    }

    let source: Arc<dyn PartitionSource> = Arc::new(ObjectStoreSource::from_store(store, None));
    let mut sync = SeriesSynchronizer::new(source);
    sync.bootstrap_catalog().await.unwrap();
    match sync.load_for_date(time::DAY_ONE).await.unwrap() {
        LoadOutcome::Loaded(slices) => {
            assert_eq!(slices[0].valid_count(), 0);
            // Third reading has no station and is dropped.
            assert_eq!(slices[1].samples.len(), 2);
            assert_eq!(slices[1].samples[1].current, Some([180.0, 1.5]));
        }
        other => panic!("expected Loaded, got {:?}", other),
    }
}

#[tokio::test]
async fn test_single_station_partition_loads_one_slice() {
    let store = Arc::new(InMemory::new());
    for (name, body) in [
        ("index.json", json!({"2024-03-01": "d1.json"})),
        (
            "stations.json",
            json!([{"stationId": "A", "coordinates": [-74.0, 40.7]}]),
        ),
        (
            "d1.json",
            json!([{"date": "2024-03-01T00:00", "samples": [[90, 2.0]]}]),
        ),
    ] {
        store
            .put(&Path::from(name), Bytes::from(body.to_string()).into())
            .await
            .unwrap();
    }

    let source: Arc<dyn PartitionSource> = Arc::new(ObjectStoreSource::from_store(store, None));
    let mut sync = SeriesSynchronizer::new(source);
    sync.bootstrap_catalog().await.unwrap();
    match sync.load_for_date("2024-03-01").await.unwrap() {
        LoadOutcome::Loaded(slices) => {
            assert_eq!(slices.len(), 1);
            assert_eq!(slices[0].date, "2024-03-01T00:00");
            assert_eq!(slices[0].timestamp, at("2024-03-01 00:00:00"));
            assert_eq!(slices[0].samples.len(), 1);
            let sample = &slices[0].samples[0];
            assert_eq!(sample.station.station_id, "A");
            assert_eq!(sample.valid_current(), Some([90.0, 2.0]));
        }
        other => panic!("expected Loaded, got {:?}", other),
    }
    assert!(sync.is_loaded("2024-03-01"));
}
