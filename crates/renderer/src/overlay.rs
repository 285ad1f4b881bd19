//! Painting a scalar overlay and its color legend.

use tiny_skia::{Pixmap, Rect, Transform};

use flow_field::overlay::{Overlay, OVERLAY_CELL};
use projection::View;

use crate::error::{RenderError, RenderResult};
use crate::style::rainbow;

/// Opacity of overlay cells.
pub const CELL_ALPHA: f64 = 0.6;

/// Opacity of the legend ramp.
pub const LEGEND_ALPHA: f64 = 0.9;

/// Paint every overlay cell plus the legend onto a fresh raster.
pub fn paint_overlay(overlay: &Overlay, view: View) -> RenderResult<Pixmap> {
    let mut pixmap = Pixmap::new(view.width, view.height).ok_or(RenderError::Allocation {
        width: view.width,
        height: view.height,
    })?;

    paint_legend(&mut pixmap, view);

    let size = OVERLAY_CELL as f32;
    for cell in overlay.cells() {
        if let Some(rect) = Rect::from_xywh(cell.x as f32, cell.y as f32, size, size) {
            let paint = rainbow(cell.z, CELL_ALPHA).paint();
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    Ok(pixmap)
}

/// One-pixel columns across the bottom right, from the low end on the left.
fn paint_legend(pixmap: &mut Pixmap, view: View) {
    let n = view.width as f64 / 5.0;
    let right = view.width as f64 - 10.0;
    let top = view.height as f32 - 20.0;

    let mut i = n;
    while i >= 0.0 {
        let paint = rainbow(1.0 - i / n, LEGEND_ALPHA).paint();
        if let Some(rect) = Rect::from_xywh((right - i) as f32, top, 1.0, 10.0) {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
        i -= 1.0;
    }
}
