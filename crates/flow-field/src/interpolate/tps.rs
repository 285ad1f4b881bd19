//! Smoothed thin-plate spline for scalar overlays.

use nalgebra::{DMatrix, DVector};

use currents_common::{CurrentsError, CurrentsResult};

use crate::interpolate::ScalarPoint;

/// Radial basis `r² ln r`, zero at the origin.
fn kernel(r2: f64) -> f64 {
    if r2 <= 0.0 {
        0.0
    } else {
        0.5 * r2 * r2.ln()
    }
}

/// Thin-plate spline fitted to scattered scalar samples.
///
/// `rigidity` is the smoothing term added to the kernel diagonal; zero gives
/// exact interpolation.
#[derive(Debug, Clone)]
pub struct ThinPlateSpline {
    centers: Vec<[f64; 2]>,
    weights: DVector<f64>,
    /// Affine part: `a0 + a1·x + a2·y`
    affine: [f64; 3],
}

impl ThinPlateSpline {
    pub fn fit(points: &[ScalarPoint], rigidity: f64) -> CurrentsResult<Self> {
        let n = points.len();
        if n < 3 {
            return Err(CurrentsError::InsufficientSamples {
                required: 3,
                found: n,
            });
        }

        let size = n + 3;
        let mut a = DMatrix::<f64>::zeros(size, size);
        let mut b = DVector::<f64>::zeros(size);

        for (i, p) in points.iter().enumerate() {
            for (j, q) in points.iter().enumerate().skip(i + 1) {
                let dx = p.x - q.x;
                let dy = p.y - q.y;
                let k = kernel(dx * dx + dy * dy);
                a[(i, j)] = k;
                a[(j, i)] = k;
            }
            a[(i, i)] = rigidity;

            a[(i, n)] = 1.0;
            a[(i, n + 1)] = p.x;
            a[(i, n + 2)] = p.y;
            a[(n, i)] = 1.0;
            a[(n + 1, i)] = p.x;
            a[(n + 2, i)] = p.y;

            b[i] = p.value;
        }

        let solution = a
            .lu()
            .solve(&b)
            .filter(|s| s.iter().all(|v| v.is_finite()))
            .ok_or_else(|| {
                CurrentsError::interpolation("thin-plate spline system is singular")
            })?;

        Ok(Self {
            centers: points.iter().map(|p| [p.x, p.y]).collect(),
            weights: solution.rows(0, n).into_owned(),
            affine: [solution[n], solution[n + 1], solution[n + 2]],
        })
    }

    /// Spline value at a pixel.
    pub fn interpolate(&self, x: f64, y: f64) -> f64 {
        let mut z = self.affine[0] + self.affine[1] * x + self.affine[2] * y;
        for (c, w) in self.centers.iter().zip(self.weights.iter()) {
            let dx = x - c[0];
            let dy = y - c[1];
            z += w * kernel(dx * dx + dy * dy);
        }
        z
    }
}
