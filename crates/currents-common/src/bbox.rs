//! Geographic bounding box of the study area.

use serde::{Deserialize, Serialize};

/// A longitude/latitude bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a GeoJSON `bbox` member: `[minx, miny, maxx, maxy]`.
    pub fn from_slice(values: &[f64]) -> Result<Self, BboxParseError> {
        match values {
            [min_x, min_y, max_x, max_y] => {
                let bbox = Self::new(*min_x, *min_y, *max_x, *max_y);
                if bbox.is_valid() {
                    Ok(bbox)
                } else {
                    Err(BboxParseError::Inverted(format!("{:?}", values)))
                }
            }
            _ => Err(BboxParseError::InvalidFormat(format!("{:?}", values))),
        }
    }

    /// Smallest box covering every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut iter = points.into_iter();
        let [x, y] = iter.next()?;
        let mut bbox = Self::new(x, y, x, y);
        for [x, y] in iter {
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }
        Some(bbox)
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point `(lng, lat)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// True when min is not greater than max on both axes and all values are finite.
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bbox: {0}. Expected [minx, miny, maxx, maxy]")]
    InvalidFormat(String),

    #[error("Inverted or non-finite bbox: {0}")]
    Inverted(String),
}
