//! Bounding box value type and overlap measurement.

use serde::{Deserialize, Serialize};

/// A single detection: an axis-aligned box with a confidence score.
///
/// Coordinates follow the inclusive pixel convention of the detection CSVs:
/// a box with `x0 == x1` spans one pixel column, not zero. `x0 <= x1` and
/// `y0 <= y1` are expected but not validated; degenerate boxes simply never
/// overlap anything (see [`BBox::iou`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub confidence: f64,
    /// Logical-delete marker set by the cluster-merge engine. Once set it is
    /// never cleared, so indices stay stable while a group is processed.
    #[serde(default, skip_serializing)]
    pub suppressed: bool,
}

impl BBox {
    /// Create a new live (non-suppressed) box.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64, confidence: f64) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            confidence,
            suppressed: false,
        }
    }

    /// Inclusive pixel area: a single-pixel box has area 1.
    pub fn area(&self) -> f64 {
        (self.x1 - self.x0 + 1.0) * (self.y1 - self.y0 + 1.0)
    }

    /// Intersection over union with another box, inclusive pixel convention.
    ///
    /// Returns exactly 0.0 when the intersection extent is empty along
    /// either axis. Degenerate boxes (`x1 < x0` or `y1 < y0`) fall out of
    /// the same extent check and report no overlap.
    pub fn iou(&self, other: &BBox) -> f64 {
        let lr = self.x1.min(other.x1) - self.x0.max(other.x0) + 1.0;
        if lr <= 0.0 {
            return 0.0;
        }
        let tb = self.y1.min(other.y1) - self.y0.max(other.y0) + 1.0;
        if tb <= 0.0 {
            return 0.0;
        }

        let intersection = lr * tb;
        let union = self.area() + other.area() - intersection;

        intersection / union
    }
}
