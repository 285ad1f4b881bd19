//! k-nearest-neighbor inverse distance weighting.

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::interpolate::{Penalty, VectorPoint};

type Node = GeomWithData<[f64; 2], usize>;

/// Vector interpolator over a fixed set of projected samples.
///
/// Each query blends the `k` nearest samples with weights
/// `1 / (d² · penalty)`. A query that coincides with a sample returns it.
pub struct IdwInterpolator<P: Penalty> {
    tree: RTree<Node>,
    points: Vec<VectorPoint>,
    k: usize,
    penalty: P,
}

impl<P: Penalty> IdwInterpolator<P> {
    pub fn new(points: Vec<VectorPoint>, k: usize, penalty: P) -> Self {
        let nodes = points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new([p.x, p.y], i))
            .collect();
        Self {
            tree: RTree::bulk_load(nodes),
            points,
            k: k.max(1),
            penalty,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Interpolated `(u, v)` at a pixel, or `None` with no samples.
    pub fn interpolate(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let mut weight_sum = 0.0;
        let mut u = 0.0;
        let mut v = 0.0;

        for node in self.tree.nearest_neighbor_iter(&[x, y]).take(self.k) {
            let p = &self.points[node.data];
            let dx = p.x - x;
            let dy = p.y - y;
            let d2 = dx * dx + dy * dy;
            if d2 == 0.0 {
                return Some((p.u, p.v));
            }
            let w = 1.0 / (d2 * self.penalty.penalty(p.x, p.y, x, y));
            u += p.u * w;
            v += p.v * w;
            weight_sum += w;
        }

        if weight_sum > 0.0 {
            Some((u / weight_sum, v / weight_sum))
        } else {
            None
        }
    }
}
