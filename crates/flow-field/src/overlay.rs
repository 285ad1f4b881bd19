//! Scalar overlay raster.
//!
//! A thin-plate spline is fitted to one scalar per station, then evaluated on
//! every second column and row inside the display mask. Values are clamped to
//! the overlay's declared range and normalised to `[0, 1]` for coloring.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use currents_common::{CurrentsError, CurrentsResult, TimeSlice};
use projection::{DisplayBounds, Projection};

use crate::config::FieldConfig;
use crate::interpolate::{ScalarPoint, ThinPlateSpline};
use crate::mask::Mask;
use crate::scheduler::{run_cooperative, BatchTask, Progress};

/// Distance between evaluated overlay cells, in pixels.
pub const OVERLAY_CELL: i32 = 2;

/// How normalised overlay values map onto the color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayScale {
    Line,
    Log,
}

/// Metadata for one kind of scalar overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayKind {
    pub id: &'static str,
    pub min: f64,
    pub max: f64,
    pub scale: OverlayScale,
    pub precision: usize,
    pub label: &'static str,
    pub unit: &'static str,
}

impl OverlayKind {
    pub const TIDAL_CURRENT_SPEED: OverlayKind = OverlayKind {
        id: "tcspd",
        min: -6.0,
        max: 6.0,
        scale: OverlayScale::Line,
        precision: 1,
        label: "Tidal Current Speed",
        unit: " knots",
    };

    const ALL: [OverlayKind; 1] = [Self::TIDAL_CURRENT_SPEED];

    /// Look up a kind by id. `None` and unknown ids mean no overlay.
    pub fn from_id(id: &str) -> Option<OverlayKind> {
        Self::ALL.iter().copied().find(|kind| kind.id == id)
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Spline smoothing: 5% of the declared range.
    pub fn rigidity(&self) -> f64 {
        self.range() * 0.05
    }

    /// Clamp `value` to the range and map it to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        let z = (value.clamp(self.min, self.max) - self.min) / self.range();
        match self.scale {
            OverlayScale::Line => z,
            OverlayScale::Log => (z * 100.0 + 1.0).ln() / 101f64.ln(),
        }
    }

    /// Scalar projected from every sample with a finite reading.
    pub fn scalar_points(&self, slice: &TimeSlice, projection: &dyn Projection) -> Vec<ScalarPoint> {
        slice
            .samples
            .iter()
            .filter_map(|sample| {
                let [_, speed] = sample.valid_current()?;
                let [x, y] = projection.project(sample.coordinates()[0], sample.coordinates()[1]);
                Some(ScalarPoint { x, y, value: speed })
            })
            .collect()
    }
}

/// One evaluated overlay cell with its normalised value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayCell {
    pub x: i32,
    pub y: i32,
    pub z: f64,
}

/// Finished overlay: the spline for point queries plus the painted cells.
#[derive(Debug, Clone)]
pub struct Overlay {
    kind: OverlayKind,
    spline: ThinPlateSpline,
    cells: Vec<OverlayCell>,
}

impl Overlay {
    pub fn kind(&self) -> &OverlayKind {
        &self.kind
    }

    pub fn cells(&self) -> &[OverlayCell] {
        &self.cells
    }

    /// Raw spline value at a pixel, before clamping.
    pub fn value_at(&self, x: f64, y: f64) -> f64 {
        self.spline.interpolate(x, y)
    }
}

/// Resumable overlay evaluation, two columns per unit step.
pub struct OverlayBuilder {
    kind: OverlayKind,
    spline: ThinPlateSpline,
    mask: Arc<Mask>,
    bounds: DisplayBounds,
    x: i32,
    cells: Vec<OverlayCell>,
}

impl OverlayBuilder {
    pub fn new(
        kind: OverlayKind,
        slices: &[TimeSlice],
        projection: &dyn Projection,
        bounds: DisplayBounds,
        mask: Arc<Mask>,
    ) -> CurrentsResult<Self> {
        let slice = slices
            .first()
            .ok_or_else(|| CurrentsError::data_load("overlay", "no data in response"))?;

        let points = kind.scalar_points(slice, projection);
        let spline = ThinPlateSpline::fit(&points, kind.rigidity())?;

        Ok(Self {
            kind,
            spline,
            mask,
            bounds,
            x: bounds.x,
            cells: Vec::new(),
        })
    }
}

impl BatchTask for OverlayBuilder {
    type Output = Overlay;

    fn step(&mut self) -> CurrentsResult<bool> {
        let x_bound = self.bounds.x_bound();
        if self.x >= x_bound {
            return Ok(false);
        }
        let x = self.x;
        for y in (self.bounds.y..self.bounds.y_bound()).step_by(OVERLAY_CELL as usize) {
            if self.mask.display_mask(x, y) {
                let z = self.kind.normalize(self.spline.interpolate(x as f64, y as f64));
                self.cells.push(OverlayCell { x, y, z });
            }
        }
        self.x += OVERLAY_CELL;
        Ok(self.x < x_bound)
    }

    fn progress(&self) -> Progress {
        Progress {
            label: "overlay",
            position: self.x as i64,
            bound: self.bounds.x_bound() as i64,
        }
    }

    fn finish(self) -> CurrentsResult<Overlay> {
        Ok(Overlay {
            kind: self.kind,
            spline: self.spline,
            cells: self.cells,
        })
    }
}

/// Evaluate an overlay cooperatively.
#[instrument(skip_all, fields(kind = builder.kind.id))]
pub async fn build_overlay<F>(
    builder: OverlayBuilder,
    config: &FieldConfig,
    on_progress: F,
) -> CurrentsResult<Overlay>
where
    F: FnMut(&Progress),
{
    let start = Instant::now();
    let overlay = run_cooperative(
        builder,
        config.max_task_time(),
        config.min_sleep_time(),
        on_progress,
    )
    .await?;

    let elapsed = start.elapsed();
    metrics::histogram!("overlay_build_seconds").record(elapsed.as_secs_f64());
    info!(
        cells = overlay.cells.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Overlay drawn"
    );
    Ok(overlay)
}
