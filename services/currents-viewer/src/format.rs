//! Text shown for a queried point.

use std::f64::consts::TAU;

use flow_field::OverlayKind;

/// `40.700000º N, 74.000000º W`
pub fn format_coordinates(lng: f64, lat: f64) -> String {
    format!(
        "{:.6}º {}, {:.6}º {}",
        lat.abs(),
        if lat >= 0.0 { "N" } else { "S" },
        lng.abs(),
        if lng >= 0.0 { "E" } else { "W" },
    )
}

/// Bearing and speed of a screen-space vector in knots: `90º @ 2.0 knots`.
///
/// The bearing is the compass direction the current flows toward.
pub fn format_vector(u: f64, v: f64) -> String {
    let degrees = (-u).atan2(v) / TAU * 360.0 + 180.0;
    let speed = (u * u + v * v).sqrt();
    format!("{:.0}º @ {:.1} knots", degrees, speed)
}

/// Overlay value clamped to the kind's range, with its precision and unit.
pub fn format_overlay_value(kind: &OverlayKind, value: f64) -> String {
    let value = value.min(kind.max).max(kind.min.min(0.0));
    format!("{:.*}{}", kind.precision, value, kind.unit)
}
