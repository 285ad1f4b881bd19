//! Static map layers: coastline, station markers and user points.

use tiny_skia::{FillRule, Path, PathBuilder, Pixmap, Stroke, Transform};

use currents_common::TimeSlice;
use projection::{Projection, View};

use crate::error::{RenderError, RenderResult};
use crate::style::Rgba;

const COASTLINE: Rgba = Rgba::opaque(128, 128, 128);
const STATION: Rgba = Rgba::opaque(255, 165, 0);
const USER_POINT: Rgba = Rgba::opaque(0, 0, 255);

pub const STATION_RADIUS: f32 = 2.0;
pub const USER_POINT_RADIUS: f32 = 4.0;

fn blank(view: View) -> RenderResult<Pixmap> {
    Pixmap::new(view.width, view.height).ok_or(RenderError::Allocation {
        width: view.width,
        height: view.height,
    })
}

/// Coastline outline plus a dot for every station with a usable reading.
pub fn render_basemap(
    coastline: Option<&Path>,
    slice: Option<&TimeSlice>,
    projection: &dyn Projection,
    view: View,
) -> RenderResult<Pixmap> {
    let mut pixmap = blank(view)?;

    if let Some(path) = coastline {
        let mut stroke = Stroke::default();
        stroke.width = 1.0;
        pixmap.stroke_path(path, &COASTLINE.paint(), &stroke, Transform::identity(), None);
    }

    if let Some(slice) = slice {
        let mut pb = PathBuilder::new();
        for sample in slice.samples.iter().filter(|s| s.valid_current().is_some()) {
            let [x, y] = projection.project(sample.coordinates()[0], sample.coordinates()[1]);
            pb.push_circle(x as f32, y as f32, STATION_RADIUS);
        }
        if let Some(path) = pb.finish() {
            pixmap.fill_path(&path, &STATION.paint(), FillRule::Winding, Transform::identity(), None);
        }
    }

    Ok(pixmap)
}

/// Hollow blue rings at every queried point.
pub fn render_user_points(points: &[[f64; 2]], view: View) -> RenderResult<Pixmap> {
    let mut pixmap = blank(view)?;

    let mut pb = PathBuilder::new();
    for [x, y] in points {
        pb.push_circle(*x as f32, *y as f32, USER_POINT_RADIUS);
    }
    if let Some(path) = pb.finish() {
        let mut stroke = Stroke::default();
        stroke.width = 2.0;
        pixmap.stroke_path(&path, &USER_POINT.paint(), &stroke, Transform::identity(), None);
    }

    Ok(pixmap)
}
