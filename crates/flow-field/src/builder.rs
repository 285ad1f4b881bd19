//! Field grid builder.
//!
//! Interpolates the station vectors of one time slice onto every in-domain
//! pixel of the display bounds, one column per scheduler unit.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use currents_common::time::strip_fixed_offset;
use currents_common::{CurrentsError, CurrentsResult, TimeSlice};
use projection::{DisplayBounds, Projection};

use crate::config::FieldConfig;
use crate::field::{Column, Field, FieldVector, Magnitude};
use crate::interpolate::{componentize, IdwInterpolator, ObstructionPenalty, VectorPoint};
use crate::mask::Mask;
use crate::scheduler::{run_cooperative, BatchTask, Progress};

/// Fewest usable stations a vector field is built from, whatever `k` is.
pub const MIN_VECTOR_SAMPLES: usize = 5;

/// Project every usable sample of a slice and convert it to `(u, v)`.
pub fn vector_points(slice: &TimeSlice, projection: &dyn Projection) -> Vec<VectorPoint> {
    slice
        .samples
        .iter()
        .filter_map(|sample| {
            let current = sample.valid_current()?;
            let [x, y] = projection.project(sample.coordinates()[0], sample.coordinates()[1]);
            let (u, v) = componentize(current);
            Some(VectorPoint { x, y, u, v })
        })
        .collect()
}

/// Resumable column-by-column field build.
pub struct FieldBuilder {
    interpolator: IdwInterpolator<ObstructionPenalty>,
    mask: Arc<Mask>,
    bounds: DisplayBounds,
    velocity_scale: f64,
    x: i32,
    columns: Vec<Option<Column>>,
    date: String,
}

impl FieldBuilder {
    /// Prepare a build from the first slice of `slices`.
    pub fn new(
        slices: &[TimeSlice],
        projection: &dyn Projection,
        bounds: DisplayBounds,
        velocity_scale: f64,
        mask: Arc<Mask>,
        config: &FieldConfig,
    ) -> CurrentsResult<Self> {
        let slice = slices.first().ok_or(CurrentsError::InsufficientSamples {
            required: 1,
            found: 0,
        })?;

        let points = vector_points(slice, projection);
        if points.len() < MIN_VECTOR_SAMPLES {
            return Err(CurrentsError::InsufficientSamples {
                required: MIN_VECTOR_SAMPLES,
                found: points.len(),
            });
        }

        let penalty = ObstructionPenalty::new(
            mask.clone(),
            config.penalty_step_px,
            config.penalty_multiplier,
        );

        Ok(Self {
            interpolator: IdwInterpolator::new(points, config.idw_neighbors, penalty),
            mask,
            bounds,
            velocity_scale,
            x: bounds.x,
            columns: Vec::with_capacity(bounds.width.max(0) as usize),
            date: slice.date.clone(),
        })
    }

    fn interpolate_column(&self, x: i32) -> CurrentsResult<Option<Column>> {
        let y_bound = self.bounds.y_bound();

        let mut y_min = self.bounds.y;
        while y_min < y_bound && !self.mask.field_mask(x, y_min) {
            y_min += 1;
        }
        if y_min >= y_bound {
            return Ok(None);
        }
        let mut y_max = y_bound - 1;
        while y_max > y_min && !self.mask.field_mask(x, y_max) {
            y_max -= 1;
        }

        let mut cells = Vec::with_capacity((y_max - y_min + 1) as usize);
        for y in y_min..=y_max {
            if !self.mask.field_mask(x, y) {
                cells.push(None);
                continue;
            }
            let (u, v) = self
                .interpolator
                .interpolate(x as f64, y as f64)
                .filter(|(u, v)| u.is_finite() && v.is_finite())
                .ok_or_else(|| {
                    CurrentsError::interpolation(format!("no finite vector at ({}, {})", x, y))
                })?;
            let magnitude = if self.mask.display_mask(x, y) {
                Magnitude::Visible((u * u + v * v).sqrt())
            } else {
                Magnitude::Invisible
            };
            cells.push(Some(FieldVector {
                u: u * self.velocity_scale,
                v: v * self.velocity_scale,
                magnitude,
            }));
        }

        Ok(Some(Column {
            start_row: y_min,
            cells,
        }))
    }
}

impl BatchTask for FieldBuilder {
    type Output = Field;

    fn step(&mut self) -> CurrentsResult<bool> {
        let x_bound = self.bounds.x_bound();
        if self.x >= x_bound {
            return Ok(false);
        }
        let column = self.interpolate_column(self.x)?;
        self.columns.push(column);
        self.x += 1;
        Ok(self.x < x_bound)
    }

    fn progress(&self) -> Progress {
        Progress {
            label: "building",
            position: self.x as i64,
            bound: self.bounds.x_bound() as i64,
        }
    }

    fn finish(self) -> CurrentsResult<Field> {
        Ok(Field::new(self.bounds.x, self.columns, self.date))
    }
}

/// Display form of a field's timestamp, without a `:SS±HH:MM` suffix.
pub fn display_date(field: &Field) -> String {
    strip_fixed_offset(field.date())
}

/// Build a field cooperatively, reporting progress on every suspension.
#[instrument(skip_all, fields(date = %builder.date))]
pub async fn build_field<F>(
    builder: FieldBuilder,
    config: &FieldConfig,
    on_progress: F,
) -> CurrentsResult<Field>
where
    F: FnMut(&Progress),
{
    let start = Instant::now();
    let field = run_cooperative(
        builder,
        config.max_task_time(),
        config.min_sleep_time(),
        on_progress,
    )
    .await?;

    let elapsed = start.elapsed();
    metrics::histogram!("field_build_seconds").record(elapsed.as_secs_f64());
    info!(
        columns = field.columns().len(),
        cells = field.total_weight(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Field built"
    );
    Ok(field)
}
