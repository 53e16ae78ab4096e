//! Per-image grouping of detections.

use crate::bbox::BBox;

/// All boxes detected on one image, across every input source.
///
/// Groups are independent processing units; nothing crosses a group
/// boundary during clustering.
#[derive(Debug, Clone)]
pub struct ImageGroup {
    pub image: String,
    pub boxes: Vec<BBox>,
}

impl ImageGroup {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            boxes: Vec::new(),
        }
    }

    /// Boxes that survived suppression and sit at or above the confidence
    /// floor, in their post-clustering order.
    pub fn survivors(&self, min_confidence: f64) -> impl Iterator<Item = &BBox> {
        self.boxes
            .iter()
            .filter(move |b| !b.suppressed && b.confidence >= min_confidence)
    }
}
