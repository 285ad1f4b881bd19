//! Tests for the shared data model: stations, slices and boundaries together.

use std::sync::Arc;

use currents_common::{Boundary, BoundingBox, CurrentsError, Station, TimeSlice};
use serde_json::json;

// ============================================================================
// Station file parsing
// ============================================================================

#[test]
fn test_station_file_roundtrip_order() {
    let raw = json!([
        {"stationId": "ACT3996", "coordinates": [-74.0, 40.7]},
        {"stationId": "NYH1905", "coordinates": [-74.05, 40.6]},
        {"stationId": 8518750, "coordinates": [-74.1, 40.65]}
    ]);
    let stations: Vec<Station> = serde_json::from_value(raw).unwrap();
    assert_eq!(stations.len(), 3);
    assert_eq!(stations[2].station_id, "8518750");
    assert_eq!(stations[1].lat(), 40.6);
}

#[test]
fn test_station_missing_coordinates_rejected() {
    let raw = json!([{"stationId": "A"}]);
    let result: Result<Vec<Station>, _> = serde_json::from_value(raw);
    let err: CurrentsError = result.unwrap_err().into();
    assert!(err.is_recoverable());
}

// ============================================================================
// Time slices
// ============================================================================

#[test]
fn test_slice_samples_share_station_records() {
    let stations = vec![
        Arc::new(Station::new("A", -74.0, 40.7)),
        Arc::new(Station::new("B", -74.1, 40.6)),
    ];
    let rows = vec![json!([90, 2.0]), json!([180, 0.5])];
    let first = TimeSlice::assemble("2024-03-01 00:00:00", &rows, &stations).unwrap();
    let second = TimeSlice::assemble("2024-03-01 00:15:00", &rows, &stations).unwrap();

    assert!(Arc::ptr_eq(&first.samples[0].station, &second.samples[0].station));
    assert!(first.timestamp < second.timestamp);
    assert_eq!(second.valid_count(), 2);
}

#[test]
fn test_slice_with_bad_timestamp_fails() {
    let stations = vec![Arc::new(Station::new("A", -74.0, 40.7))];
    let err = TimeSlice::assemble("not a date", &[json!([1, 1])], &stations).unwrap_err();
    assert!(matches!(err, CurrentsError::InvalidTime(_)));
}

#[test]
fn test_short_row_leaves_trailing_stations_out() {
    let stations = vec![
        Arc::new(Station::new("A", -74.0, 40.7)),
        Arc::new(Station::new("B", -74.1, 40.6)),
    ];
    let slice = TimeSlice::assemble("2024-03-01", &[json!([10, 1])], &stations).unwrap();
    assert_eq!(slice.samples.len(), 1);
    assert_eq!(slice.samples[0].station_id(), "A");
}

// ============================================================================
// Boundaries
// ============================================================================

#[test]
fn test_feature_boundary_computes_extent() {
    let s = r#"{
        "type": "Feature",
        "properties": {"name": "harbor"},
        "geometry": {"type": "Polygon", "coordinates": [
            [[-74.3, 40.4], [-73.7, 40.4], [-73.7, 40.9], [-74.3, 40.9], [-74.3, 40.4]],
            [[-74.0, 40.6], [-73.9, 40.6], [-73.9, 40.7], [-74.0, 40.6]]
        ]}
    }"#;
    let boundary = Boundary::from_geojson_str(s).unwrap();
    assert_eq!(boundary.rings.len(), 2);
    assert_eq!(boundary.bbox, BoundingBox::new(-74.3, 40.4, -73.7, 40.9));
}

#[test]
fn test_multilinestring_mesh_boundary() {
    let s = r#"{"type": "MultiLineString", "coordinates": [
        [[-74.0, 40.0], [-73.0, 40.0]],
        [[-73.0, 40.0], [-73.0, 41.0], [-74.0, 41.0], [-74.0, 40.0]]
    ]}"#;
    let boundary = Boundary::from_geojson_str(s).unwrap();
    assert_eq!(boundary.rings.len(), 2);
    assert_eq!(boundary.vertex_count(), 6);
}

#[test]
fn test_boundary_rejects_inverted_bbox() {
    let s = r#"{"type": "Polygon", "bbox": [10, 10, 0, 0],
        "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}"#;
    assert!(matches!(
        Boundary::from_geojson_str(s),
        Err(CurrentsError::Boundary(_))
    ));
}

#[test]
fn test_boundary_rejects_point_geometry() {
    let s = r#"{"type": "Point", "coordinates": [0, 0]}"#;
    assert!(Boundary::from_geojson_str(s).is_err());
}
