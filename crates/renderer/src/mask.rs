//! Rasterizing the boundary into the field and display masks.
//!
//! The projected outer boundary from [`boundary_path`](crate::boundary_path)
//! is painted three times onto a transparent view-sized raster:
//!
//! 1. stroked red at the field mask width, so the field extends a band past
//!    the coastline and particles near shore still find vectors;
//! 2. filled yellow, marking the water;
//! 3. stroked red again at half a pixel, pulling the display edge inward.
//!
//! The red channel then reads as the field mask and the green channel as the
//! display mask.

use std::time::Instant;

use tiny_skia::{FillRule, Path, Pixmap, Stroke, Transform};
use tracing::{debug, instrument};

use flow_field::Mask;
use projection::View;

use crate::error::{RenderError, RenderResult};
use crate::style::Rgba;

/// Width of the final coastline stroke, in pixels.
pub const COASTLINE_WIDTH: f32 = 0.5;

fn paint_mask_raster(path: &Path, view: View, field_mask_width: f32) -> RenderResult<Pixmap> {
    let mut pixmap = Pixmap::new(view.width, view.height).ok_or(RenderError::Allocation {
        width: view.width,
        height: view.height,
    })?;

    let red = Rgba::RED.paint();
    let yellow = Rgba::YELLOW.paint();

    let mut stroke = Stroke::default();
    stroke.width = field_mask_width;
    pixmap.stroke_path(path, &red, &stroke, Transform::identity(), None);

    pixmap.fill_path(path, &yellow, FillRule::EvenOdd, Transform::identity(), None);

    stroke.width = COASTLINE_WIDTH;
    pixmap.stroke_path(path, &red, &stroke, Transform::identity(), None);

    Ok(pixmap)
}

/// Decode the field and display masks from a projected coastline.
#[instrument(skip_all, fields(width = view.width, height = view.height, field_mask_width = field_mask_width as f64))]
pub fn render_masks(path: &Path, view: View, field_mask_width: f32) -> RenderResult<Mask> {
    let start = Instant::now();
    let pixmap = paint_mask_raster(path, view, field_mask_width)?;
    let mask = Mask::from_rgba(view.width as usize, view.height as usize, pixmap.data())?;

    debug!(
        field_pixels = mask.field_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Masks rendered"
    );
    Ok(mask)
}
