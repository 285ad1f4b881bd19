//! Outer boundary of the study area, read from GeoJSON.
//!
//! The boundary drives two things: the projection fit (through its bbox) and
//! the mask rasterization (through its rings). Polygon holes and islands are
//! kept as separate rings; the rasterizer fills with the even-odd rule.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{CurrentsError, CurrentsResult};

/// GeoJSON geometry types accepted as a boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum BoundaryGeometry {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    /// Mesh-style boundaries (shared arcs) arrive as line strings.
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
}

impl BoundaryGeometry {
    fn push_rings(self, rings: &mut Vec<Vec<[f64; 2]>>) {
        match self {
            BoundaryGeometry::Polygon { coordinates } => rings.extend(coordinates),
            BoundaryGeometry::MultiPolygon { coordinates } => {
                rings.extend(coordinates.into_iter().flatten())
            }
            BoundaryGeometry::LineString { coordinates } => rings.push(coordinates),
            BoundaryGeometry::MultiLineString { coordinates } => rings.extend(coordinates),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct BoundaryFeature {
    geometry: Option<BoundaryGeometry>,
}

#[derive(Debug, Clone, Deserialize)]
struct BoundaryFeatureCollection {
    features: Vec<BoundaryFeature>,
}

/// Optional top-level `bbox` member of any GeoJSON object.
#[derive(Debug, Clone, Deserialize)]
struct DeclaredBbox {
    #[serde(default)]
    bbox: Option<Vec<f64>>,
}

/// Projected-space independent boundary: rings of `[lng, lat]` plus extent.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub rings: Vec<Vec<[f64; 2]>>,
    pub bbox: BoundingBox,
}

impl Boundary {
    /// Build a boundary from rings, computing the extent.
    pub fn from_rings(rings: Vec<Vec<[f64; 2]>>) -> CurrentsResult<Self> {
        let rings: Vec<_> = rings.into_iter().filter(|r| r.len() >= 2).collect();
        let bbox = BoundingBox::from_points(rings.iter().flatten().copied())
            .ok_or_else(|| CurrentsError::Boundary("boundary has no coordinates".into()))?;
        Ok(Self { rings, bbox })
    }

    /// Parse a GeoJSON document (geometry, Feature or FeatureCollection).
    ///
    /// A top-level `bbox` member takes precedence over the computed extent.
    pub fn from_geojson_str(s: &str) -> CurrentsResult<Self> {
        let invalid = |e: serde_json::Error| CurrentsError::Boundary(format!("invalid GeoJSON: {}", e));
        let value: serde_json::Value = serde_json::from_str(s).map_err(invalid)?;
        let declared: DeclaredBbox = serde_json::from_value(value.clone()).map_err(invalid)?;

        let mut rings = Vec::new();
        match value.get("type").and_then(|t| t.as_str()) {
            Some("FeatureCollection") => {
                let collection: BoundaryFeatureCollection =
                    serde_json::from_value(value).map_err(invalid)?;
                for geometry in collection.features.into_iter().filter_map(|f| f.geometry) {
                    geometry.push_rings(&mut rings);
                }
            }
            Some("Feature") => {
                let feature: BoundaryFeature = serde_json::from_value(value).map_err(invalid)?;
                if let Some(geometry) = feature.geometry {
                    geometry.push_rings(&mut rings);
                }
            }
            Some(_) => {
                let geometry: BoundaryGeometry = serde_json::from_value(value).map_err(invalid)?;
                geometry.push_rings(&mut rings);
            }
            None => {
                return Err(CurrentsError::Boundary(
                    "GeoJSON object has no type member".into(),
                ))
            }
        }

        let mut boundary = Self::from_rings(rings)?;
        if let Some(values) = declared.bbox {
            boundary.bbox = BoundingBox::from_slice(&values)
                .map_err(|e| CurrentsError::Boundary(e.to_string()))?;
        }
        Ok(boundary)
    }

    /// Total number of vertices across all rings.
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polygon() {
        let s = r#"{"type":"Polygon","coordinates":[[[-74,40],[-73,40],[-73,41],[-74,41],[-74,40]]]}"#;
        let boundary = Boundary::from_geojson_str(s).unwrap();
        assert_eq!(boundary.rings.len(), 1);
        assert_eq!(boundary.vertex_count(), 5);
        assert_eq!(boundary.bbox, BoundingBox::new(-74.0, 40.0, -73.0, 41.0));
    }

    #[test]
    fn test_parse_feature_collection_with_bbox() {
        let s = r#"{
            "type": "FeatureCollection",
            "bbox": [-75, 39, -72, 42],
            "features": [
                {"type": "Feature", "properties": {}, "geometry":
                    {"type": "MultiPolygon", "coordinates": [
                        [[[-74,40],[-73,40],[-73,41],[-74,40]]],
                        [[[-73.5,40.2],[-73.4,40.2],[-73.4,40.3],[-73.5,40.2]]]
                    ]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;
        let boundary = Boundary::from_geojson_str(s).unwrap();
        assert_eq!(boundary.rings.len(), 2);
        assert_eq!(boundary.bbox, BoundingBox::new(-75.0, 39.0, -72.0, 42.0));
    }

    #[test]
    fn test_empty_boundary_is_error() {
        let s = r#"{"type":"FeatureCollection","features":[]}"#;
        assert!(matches!(
            Boundary::from_geojson_str(s),
            Err(CurrentsError::Boundary(_))
        ));
    }
}
