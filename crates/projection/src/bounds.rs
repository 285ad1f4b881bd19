//! View dimensions and the pixel rectangle covered by the study area.

use currents_common::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::Projection;

/// Size of the rendered view in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub width: u32,
    pub height: u32,
}

impl View {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new(1232, 2000)
    }
}

/// Integer pixel rectangle enclosing the projected bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DisplayBounds {
    /// Project the bbox corners and round outward.
    ///
    /// The upper-left corner is `(min_lng, max_lat)` floored, the lower-right
    /// is `(max_lng, min_lat)` ceiled; both corners are inclusive.
    pub fn from_bbox(bbox: &BoundingBox, projection: &dyn Projection) -> Self {
        let upper_left = projection.project(bbox.min_x, bbox.max_y);
        let lower_right = projection.project(bbox.max_x, bbox.min_y);
        let x = upper_left[0].floor() as i32;
        let y = upper_left[1].floor() as i32;
        let right = lower_right[0].ceil() as i32;
        let bottom = lower_right[1].ceil() as i32;
        Self {
            x,
            y,
            width: right - x + 1,
            height: bottom - y + 1,
        }
    }

    /// Exclusive upper bound of columns.
    pub fn x_bound(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive upper bound of rows.
    pub fn y_bound(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x_bound() && y >= self.y && y < self.y_bound()
    }
}
