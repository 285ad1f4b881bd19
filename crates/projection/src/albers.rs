//! Albers equal-area conic projection.
//!
//! The conic is secant at two standard parallels (29.5°N and 45.5°N by
//! default, the usual choice for the conterminous US). The projection is
//! rotated so the central meridian of the study area runs straight up the
//! view, then scaled and translated to fit the view.

use std::f64::consts::PI;

use currents_common::BoundingBox;

use crate::bounds::View;
use crate::Projection;

/// Default standard parallels in degrees.
pub const DEFAULT_PARALLELS: [f64; 2] = [29.5, 45.5];

/// Fraction of the view the fitted area occupies along its tighter axis.
pub const FIT_PADDING: f64 = 0.95;

/// Albers equal-area conic projection parameters.
#[derive(Debug, Clone)]
pub struct AlbersEqualArea {
    /// Central meridian in radians (the projection is rotated onto it)
    lon0: f64,
    /// Cone constant
    n: f64,
    c: f64,
    /// Radius of the parallel through the origin
    r0: f64,
    /// Unscaled y of the center point
    center_y: f64,
    /// Pixels per unscaled unit
    scale: f64,
    /// Pixel position of the center point
    translate: [f64; 2],
}

impl AlbersEqualArea {
    /// Create a projection centered on `(center_lng, center_lat)` degrees.
    ///
    /// # Arguments
    /// * `parallels` - Standard parallels (degrees)
    /// * `center_lng` - Central meridian (degrees)
    /// * `center_lat` - Latitude placed at `translate` (degrees)
    /// * `scale` - Pixels per unit of the unscaled projection
    /// * `translate` - Pixel position of the center point
    pub fn new(
        parallels: [f64; 2],
        center_lng: f64,
        center_lat: f64,
        scale: f64,
        translate: [f64; 2],
    ) -> Self {
        let to_rad = PI / 180.0;
        let sy0 = (parallels[0] * to_rad).sin();
        let sy1 = (parallels[1] * to_rad).sin();

        let n = (sy0 + sy1) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        let r0 = c.sqrt() / n;

        let mut proj = Self {
            lon0: center_lng * to_rad,
            n,
            c,
            r0,
            center_y: 0.0,
            scale,
            translate,
        };
        let [_, cy] = proj.raw(0.0, center_lat * to_rad);
        proj.center_y = cy;
        proj
    }

    /// Fit the bounding box into the view, centered, using 95% of the tighter axis.
    pub fn fit(bbox: &BoundingBox, view: View) -> Self {
        let (center_lng, center_lat) = bbox.center();
        let unit = Self::new(DEFAULT_PARALLELS, center_lng, center_lat, 1.0, [0.0, 0.0]);

        let p0 = unit.project(bbox.min_x, bbox.min_y);
        let p1 = unit.project(bbox.max_x, bbox.max_y);
        let sx = (p1[0] - p0[0]) / view.width as f64;
        let sy = (p0[1] - p1[1]) / view.height as f64;
        let spread = sx.max(sy);
        let scale = if spread > 0.0 && spread.is_finite() {
            FIT_PADDING / spread
        } else {
            1.0
        };

        Self {
            scale,
            translate: [view.width as f64 / 2.0, view.height as f64 / 2.0],
            ..unit
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> [f64; 2] {
        self.translate
    }

    /// Unscaled projection of rotated radians; y grows north.
    fn raw(&self, lambda: f64, phi: f64) -> [f64; 2] {
        let r = (self.c - 2.0 * self.n * phi.sin()).max(0.0).sqrt() / self.n;
        let theta = lambda * self.n;
        [r * theta.sin(), self.r0 - r * theta.cos()]
    }

    fn raw_invert(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        let r0y = self.r0 - y;
        let mut l = x.atan2(r0y.abs()) * r0y.signum();
        if r0y * self.n < 0.0 {
            l -= PI * x.signum() * r0y.signum();
        }
        let s = (self.c - (x * x + r0y * r0y) * self.n * self.n) / (2.0 * self.n);
        if !(-1.0..=1.0).contains(&s) {
            return None;
        }
        Some([l / self.n, s.asin()])
    }
}

/// Wrap a longitude difference to [-π, π].
fn wrap(mut lambda: f64) -> f64 {
    while lambda > PI {
        lambda -= 2.0 * PI;
    }
    while lambda < -PI {
        lambda += 2.0 * PI;
    }
    lambda
}

impl Projection for AlbersEqualArea {
    fn project(&self, lng: f64, lat: f64) -> [f64; 2] {
        let to_rad = PI / 180.0;
        let [x, y] = self.raw(wrap(lng * to_rad - self.lon0), lat * to_rad);
        [
            self.translate[0] + self.scale * x,
            self.translate[1] - self.scale * (y - self.center_y),
        ]
    }

    fn invert(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        let to_deg = 180.0 / PI;
        let rx = (x - self.translate[0]) / self.scale;
        let ry = self.center_y - (y - self.translate[1]) / self.scale;
        let [lambda, phi] = self.raw_invert(rx, ry)?;
        Some([wrap(lambda + self.lon0) * to_deg, phi * to_deg])
    }
}
