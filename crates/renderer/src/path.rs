//! Projecting boundary rings into drawable paths.

use tiny_skia::{Path, PathBuilder};

use currents_common::Boundary;
use projection::Projection;

/// Build one path holding every ring of `boundary` in pixel space.
///
/// Rings whose first and last vertex coincide are closed; open line strings
/// stay open for stroking and are closed implicitly when filled.
pub fn boundary_path(boundary: &Boundary, projection: &dyn Projection) -> Option<Path> {
    let mut pb = PathBuilder::new();

    for ring in &boundary.rings {
        let mut points = ring.iter().map(|&[lng, lat]| projection.project(lng, lat));
        let Some([x0, y0]) = points.next() else {
            continue;
        };
        pb.move_to(x0 as f32, y0 as f32);
        for [x, y] in points {
            pb.line_to(x as f32, y as f32);
        }
        if ring.len() > 2 && ring.first() == ring.last() {
            pb.close();
        }
    }

    pb.finish()
}
