//! Display settings derived from the boundary and the view.

use std::sync::Arc;

use currents_common::Boundary;
use projection::{AlbersEqualArea, DisplayBounds, Projection, View};

use crate::config::ViewerConfig;

/// Everything the pipeline stages need to agree on.
#[derive(Clone)]
pub struct Settings {
    pub view: View,
    pub projection: Arc<dyn Projection>,
    pub display_bounds: DisplayBounds,
    pub particle_count: usize,
    pub max_particle_age: u32,
    /// Pixels per frame per knot.
    pub velocity_scale: f64,
    /// Stroke width of the outer band of the field mask.
    pub field_mask_width: f32,
    pub fade_alpha: f32,
    pub frame_rate_ms: u64,
    pub max_intensity: f64,
    pub style_count: usize,
}

impl Settings {
    /// Fit the projection to the boundary and size everything off the bounds.
    pub fn from_boundary(boundary: &Boundary, config: &ViewerConfig) -> Self {
        let projection = AlbersEqualArea::fit(&boundary.bbox, config.view);
        let bounds = DisplayBounds::from_bbox(&boundary.bbox, &projection);
        let height = bounds.height as f64;

        Self {
            view: config.view,
            projection: Arc::new(projection),
            display_bounds: bounds,
            particle_count: (height / 0.14).round() as usize,
            max_particle_age: config.field.max_particle_age,
            velocity_scale: (height / 700.0 * 1000.0).round() / 1000.0,
            field_mask_width: (height * 0.06).ceil() as f32,
            fade_alpha: config.fade_alpha,
            frame_rate_ms: config.frame_rate_ms,
            max_intensity: config.field.max_intensity,
            style_count: renderer::particle_styles().len(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("view", &self.view)
            .field("display_bounds", &self.display_bounds)
            .field("particle_count", &self.particle_count)
            .field("velocity_scale", &self.velocity_scale)
            .field("field_mask_width", &self.field_mask_width)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{bbox, rectangle_geojson};

    fn harbor() -> Boundary {
        let (min_lng, min_lat, max_lng, max_lat) = bbox::HARBOR;
        Boundary::from_geojson_str(&rectangle_geojson(min_lng, min_lat, max_lng, max_lat)).unwrap()
    }

    #[test]
    fn test_derived_from_bounds_height() {
        let settings = Settings::from_boundary(&harbor(), &ViewerConfig::default());
        let height = settings.display_bounds.height as f64;

        assert_eq!(settings.particle_count, (height / 0.14).round() as usize);
        assert_eq!(settings.field_mask_width, (height * 0.06).ceil() as f32);
        assert!((settings.velocity_scale - height / 700.0).abs() < 0.0005);
        assert_eq!(settings.style_count, 35);
        assert_eq!(settings.max_particle_age, 30);
    }

    #[test]
    fn test_bounds_fit_inside_view() {
        let settings = Settings::from_boundary(&harbor(), &ViewerConfig::default());
        let b = settings.display_bounds;
        assert!(b.x >= 0 && b.y >= 0);
        assert!(b.x_bound() <= 1232 + 1);
        assert!(b.y_bound() <= 2000 + 1);
    }
}
