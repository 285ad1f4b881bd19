//! Map projections from geographic coordinates to view pixels.
//!
//! Implements the projections from scratch without external dependencies.

pub mod albers;
pub mod bounds;

pub use albers::AlbersEqualArea;
pub use bounds::{DisplayBounds, View};

/// A mapping between `[lng, lat]` degrees and `[x, y]` pixels (y grows down).
pub trait Projection: Send + Sync {
    /// Project a geographic point to pixel space.
    fn project(&self, lng: f64, lat: f64) -> [f64; 2];

    /// Invert a pixel position, or `None` if it lies outside the projection's domain.
    fn invert(&self, x: f64, y: f64) -> Option<[f64; 2]>;
}
