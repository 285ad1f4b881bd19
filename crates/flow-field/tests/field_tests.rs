//! Field, overlay and particle tests over synthetic harbors.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

use currents_common::{CurrentsError, Station, TimeSlice};
use flow_field::{
    build_field, build_overlay, display_date, vector_points, FieldBuilder, FieldConfig, Magnitude,
    Mask, OverlayBuilder, OverlayKind, ParticleSystem, MIN_VECTOR_SAMPLES,
};
use projection::{DisplayBounds, Projection};
use test_utils::{assert_approx_eq, harbor_stations, open_water_mask, rows_with, time, wall_mask};

const WIDTH: usize = 61;
const HEIGHT: usize = 51;

/// Plate carrée over the harbor at 100 px per degree.
struct Linear;

impl Projection for Linear {
    fn project(&self, lng: f64, lat: f64) -> [f64; 2] {
        [(lng + 74.3) * 100.0, (40.9 - lat) * 100.0]
    }

    fn invert(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        Some([x / 100.0 - 74.3, 40.9 - y / 100.0])
    }
}

fn bounds() -> DisplayBounds {
    DisplayBounds {
        x: 0,
        y: 0,
        width: WIDTH as i32,
        height: HEIGHT as i32,
    }
}

fn slices_for(stations: &[Station], reading: impl Fn(usize) -> Value) -> Vec<TimeSlice> {
    let stations: Vec<Arc<Station>> = stations.iter().cloned().map(Arc::new).collect();
    rows_with(time::DAY_ONE, 2, stations.len(), |_, s| reading(s))
        .into_iter()
        .map(|(date, row)| TimeSlice::assemble(date, &row, &stations).unwrap())
        .collect()
}

fn open_mask() -> Arc<Mask> {
    let flags = open_water_mask(WIDTH, HEIGHT);
    Arc::new(Mask::from_flags(WIDTH, HEIGHT, &flags, &flags).unwrap())
}

fn quick_config() -> FieldConfig {
    FieldConfig {
        max_task_time_ms: 5,
        min_sleep_time_ms: 0,
        ..FieldConfig::default()
    }
}

// ============================================================================
// Field construction
// ============================================================================

#[tokio::test]
async fn test_uniform_eastward_field() {
    let slices = slices_for(&harbor_stations(), |_| json!([90, 2.0]));
    let config = quick_config();
    let builder = FieldBuilder::new(&slices, &Linear, bounds(), 0.5, open_mask(), &config).unwrap();
    let field = build_field(builder, &config, |_| {}).await.unwrap();

    assert_eq!(field.total_weight(), WIDTH * HEIGHT);
    assert_eq!(field.date(), "2024-03-01 00:00:00");

    // Station A projects to (30, 20).
    let at_station = field.sample(30.0, 20.0);
    assert_approx_eq!(at_station.u, 1.0, 1e-9);
    assert_approx_eq!(at_station.v, 0.0, 1e-9);
    assert_eq!(at_station.magnitude, Magnitude::Visible(2.0));

    let between = field.sample(12.0, 44.0);
    assert_approx_eq!(between.u, 1.0, 1e-9);
    assert!(field.sample(61.0, 0.0).magnitude.is_nil());
}

#[tokio::test]
async fn test_display_mask_controls_visibility() {
    let slices = slices_for(&harbor_stations(), |_| json!([90, 2.0]));
    let field_flags = open_water_mask(WIDTH, HEIGHT);
    let display_flags = wall_mask(WIDTH, HEIGHT, 0, 10);
    let mask = Arc::new(Mask::from_flags(WIDTH, HEIGHT, &field_flags, &display_flags).unwrap());

    let config = quick_config();
    let builder = FieldBuilder::new(&slices, &Linear, bounds(), 1.0, mask, &config).unwrap();
    let field = build_field(builder, &config, |_| {}).await.unwrap();

    let hidden = field.sample(5.0, 5.0);
    assert_eq!(hidden.magnitude, Magnitude::Invisible);
    assert_approx_eq!(hidden.u, 2.0, 1e-9);
    assert!(field.sample(20.0, 5.0).magnitude.is_visible());
}

#[tokio::test]
async fn test_land_pixels_are_gaps() {
    let slices = slices_for(&harbor_stations(), |_| json!([90, 2.0]));
    let flags = wall_mask(WIDTH, HEIGHT, 30, 10);
    let mask = Arc::new(Mask::from_flags(WIDTH, HEIGHT, &flags, &flags).unwrap());

    let config = quick_config();
    let builder = FieldBuilder::new(&slices, &Linear, bounds(), 1.0, mask, &config).unwrap();
    let field = build_field(builder, &config, |_| {}).await.unwrap();

    assert!(field.columns()[35].is_none());
    assert!(field.sample(35.0, 10.0).magnitude.is_nil());
    assert_eq!(field.total_weight(), (WIDTH - 10) * HEIGHT);
}

#[tokio::test]
async fn test_obstruction_shields_far_side_stations() {
    // Eastward stations left of the wall, westward stations right of it.
    let stations = vec![
        Station::new("L1", -74.25, 40.85),
        Station::new("L2", -74.25, 40.45),
        Station::new("L3", -74.2, 40.65),
        Station::new("R1", -73.85, 40.85),
        Station::new("R2", -73.85, 40.45),
        Station::new("R3", -73.8, 40.65),
    ];
    let slices = slices_for(&stations, |s| {
        if s < 3 {
            json!([90, 1.0])
        } else {
            json!([270, 1.0])
        }
    });
    let flags = wall_mask(WIDTH, HEIGHT, 30, 10);
    let mask = Arc::new(Mask::from_flags(WIDTH, HEIGHT, &flags, &flags).unwrap());

    let mut config = quick_config();
    let builder = FieldBuilder::new(&slices, &Linear, bounds(), 1.0, mask.clone(), &config).unwrap();
    let shielded = build_field(builder, &config, |_| {}).await.unwrap();

    config.penalty_multiplier = 1.0;
    let builder = FieldBuilder::new(&slices, &Linear, bounds(), 1.0, mask, &config).unwrap();
    let unshielded = build_field(builder, &config, |_| {}).await.unwrap();

    let with_wall = shielded.sample(26.0, 25.0).u;
    let without_wall = unshielded.sample(26.0, 25.0).u;
    assert!(with_wall > 0.9, "u = {}", with_wall);
    assert!(without_wall < 0.5, "u = {}", without_wall);
}

#[tokio::test]
async fn test_build_reports_progress_between_bursts() {
    let slices = slices_for(&harbor_stations(), |_| json!([90, 2.0]));
    let config = FieldConfig {
        max_task_time_ms: 0,
        min_sleep_time_ms: 0,
        ..FieldConfig::default()
    };
    let builder = FieldBuilder::new(&slices, &Linear, bounds(), 1.0, open_mask(), &config).unwrap();

    let mut reports = Vec::new();
    build_field(builder, &config, |p| reports.push(p.to_string()))
        .await
        .unwrap();

    assert_eq!(reports.len(), WIDTH - 1);
    assert_eq!(reports[0], "building: 1/61");
}

#[test]
fn test_too_few_stations_rejected() {
    let stations = &harbor_stations()[..4];
    let slices = slices_for(stations, |_| json!([90, 2.0]));
    let err = FieldBuilder::new(&slices, &Linear, bounds(), 1.0, open_mask(), &FieldConfig::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        CurrentsError::InsufficientSamples {
            required: 5,
            found: 4
        }
    ));
}

#[test]
fn test_fewer_neighbors_keep_the_station_minimum() {
    let stations = &harbor_stations()[..4];
    let slices = slices_for(stations, |_| json!([90, 2.0]));
    let config = FieldConfig {
        idw_neighbors: 3,
        ..FieldConfig::default()
    };
    let err = FieldBuilder::new(&slices, &Linear, bounds(), 1.0, open_mask(), &config)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        CurrentsError::InsufficientSamples {
            required: MIN_VECTOR_SAMPLES,
            found: 4
        }
    ));
    assert_eq!(MIN_VECTOR_SAMPLES, 5);
}

#[test]
fn test_missing_readings_do_not_count() {
    let slices = slices_for(&harbor_stations(), |s| {
        if s % 2 == 0 {
            Value::Null
        } else {
            json!([45, 1.0])
        }
    });
    assert_eq!(vector_points(&slices[0], &Linear).len(), 3);
    assert!(FieldBuilder::new(&slices, &Linear, bounds(), 1.0, open_mask(), &FieldConfig::default()).is_err());
}

#[test]
fn test_empty_slices_rejected() {
    let result = FieldBuilder::new(&[], &Linear, bounds(), 1.0, open_mask(), &FieldConfig::default());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_display_date_strips_offset() {
    let stations: Vec<Arc<Station>> = harbor_stations().into_iter().map(Arc::new).collect();
    let row: Vec<Value> = (0..6).map(|_| json!([90, 2.0])).collect();
    let slice = TimeSlice::assemble("2024-03-01 12:15:00-04:00", &row, &stations).unwrap();

    let config = quick_config();
    let builder = FieldBuilder::new(&[slice], &Linear, bounds(), 1.0, open_mask(), &config).unwrap();
    let field = build_field(builder, &config, |_| {}).await.unwrap();
    assert_eq!(display_date(&field), "2024-03-01 12:15");
}

// ============================================================================
// Overlay
// ============================================================================

#[tokio::test]
async fn test_speed_overlay_on_uniform_current() {
    let slices = slices_for(&harbor_stations(), |_| json!([90, 2.0]));
    let builder = OverlayBuilder::new(
        OverlayKind::TIDAL_CURRENT_SPEED,
        &slices,
        &Linear,
        bounds(),
        open_mask(),
    )
    .unwrap();
    let overlay = build_overlay(builder, &quick_config(), |_| {}).await.unwrap();

    // Every second column and row of a 61 x 51 raster.
    assert_eq!(overlay.cells().len(), 31 * 26);
    assert!(overlay.cells().iter().all(|c| c.x % 2 == 0 && c.y % 2 == 0));
    assert_approx_eq!(overlay.value_at(30.0, 20.0), 2.0, 1e-6);
    for cell in overlay.cells() {
        assert_approx_eq!(cell.z, 8.0 / 12.0, 1e-6);
    }
}

#[test]
fn test_overlay_needs_three_points() {
    let slices = slices_for(&harbor_stations(), |s| {
        if s < 4 {
            Value::Null
        } else {
            json!([0, 1.0])
        }
    });
    let err = OverlayBuilder::new(
        OverlayKind::TIDAL_CURRENT_SPEED,
        &slices,
        &Linear,
        bounds(),
        open_mask(),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        CurrentsError::InsufficientSamples {
            required: 3,
            found: 2
        }
    ));
}

// ============================================================================
// Particles over a built field
// ============================================================================

#[tokio::test]
async fn test_particles_draw_in_one_bucket() {
    let slices = slices_for(&harbor_stations(), |_| json!([90, 2.0]));
    let config = quick_config();
    let builder = FieldBuilder::new(&slices, &Linear, bounds(), 0.5, open_mask(), &config).unwrap();
    let field = build_field(builder, &config, |_| {}).await.unwrap();

    let mut system = ParticleSystem::new(&field, 200, 30, 8.0, 35, StdRng::seed_from_u64(42));
    assert!(system
        .particles()
        .iter()
        .all(|p| p.x >= 0.0 && p.x < WIDTH as f64 && p.y >= 0.0 && p.y < HEIGHT as f64));

    for _ in 0..5 {
        system.evolve(&field);
        let expected = system.style_index(2.0);
        let drawn: usize = system.buckets().iter().map(Vec::len).sum();
        assert!(drawn > 0);
        assert_eq!(system.buckets()[expected].len(), drawn);
        for (from, to) in system.segments(expected) {
            assert_approx_eq!(to[0] - from[0], 1.0, 1e-9);
        }
        system.commit();
    }
}
