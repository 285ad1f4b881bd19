//! Obstruction penalties between a sample and a query point.

use std::sync::Arc;

use crate::interpolate::round_half_up;
use crate::mask::Mask;

/// Multiplier applied to the squared distance of a sample-to-query segment.
pub trait Penalty: Send + Sync {
    fn penalty(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> f64;
}

/// No obstruction: every segment weighs 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPenalty;

impl Penalty for NoPenalty {
    fn penalty(&self, _x0: f64, _y0: f64, _x1: f64, _y1: f64) -> f64 {
        1.0
    }
}

/// Penalize segments that cross pixels outside the field mask.
///
/// Segments shorter than one step are never penalized. Longer segments are
/// probed at `floor(dist / step) - 1` evenly spaced interior points; the
/// first probe outside the field mask penalizes the whole segment.
#[derive(Debug, Clone)]
pub struct ObstructionPenalty {
    mask: Arc<Mask>,
    step: f64,
    multiplier: f64,
}

impl ObstructionPenalty {
    pub fn new(mask: Arc<Mask>, step: f64, multiplier: f64) -> Self {
        Self {
            mask,
            step,
            multiplier,
        }
    }
}

impl Penalty for ObstructionPenalty {
    fn penalty(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < self.step {
            return 1.0;
        }

        let steps = (dist / self.step).floor() as usize;
        let sx = dx / steps as f64;
        let sy = dy / steps as f64;

        let (mut cx, mut cy) = (x0, y0);
        for _ in 1..steps {
            cx += sx;
            cy += sy;
            if !self.mask.field_mask(round_half_up(cx), round_half_up(cy)) {
                return self.multiplier;
            }
        }
        1.0
    }
}
