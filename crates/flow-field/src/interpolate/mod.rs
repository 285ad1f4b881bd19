//! Scattered-data interpolation from station samples to pixels.
//!
//! Vectors use k-nearest-neighbor inverse distance weighting with an
//! obstruction penalty so that stations on the far side of land count for
//! little. Scalars use a smoothed thin-plate spline.

pub mod idw;
pub mod penalty;
pub mod tps;

pub use idw::IdwInterpolator;
pub use penalty::{NoPenalty, ObstructionPenalty, Penalty};
pub use tps::ThinPlateSpline;

/// A station vector projected to pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorPoint {
    pub x: f64,
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

/// A station scalar projected to pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Convert `[direction_degrees, speed]` to screen components `(u, v)`.
///
/// Direction is the compass bearing the current flows toward: 0° points up
/// the screen (negative v), 90° points right (positive u).
pub fn componentize(current: [f64; 2]) -> (f64, f64) {
    let phi = current[0].to_radians();
    let m = current[1];
    (m * phi.sin(), -(m * phi.cos()))
}

/// Round half up, so `-0.5` rounds to `0` like a canvas pixel lookup.
#[inline]
pub(crate) fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}
