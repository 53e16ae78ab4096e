//! Flexible non-maximum suppression.
//!
//! Classic NMS keeps the most confident of a set of overlapping detections
//! and throws the rest away. When the detections come from several
//! independent inference passes over the same image, that wastes
//! information: the redundant boxes are evidence of agreement. This engine
//! instead fuses strongly-overlapping boxes into a confidence-weighted
//! consensus box, softly decays moderately-overlapping ones, and rescores
//! each survivor by how much of the ensemble agreed on it.

use crate::bbox::BBox;
use crate::config::{ConfigError, NmsConfig};
use crate::group::ImageGroup;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A box folded into the current anchor, with its fusion weight captured at
/// merge time (later confidence decay does not re-weight it). Lives only
/// for one anchor iteration.
struct MergeCandidate {
    index: usize,
    weight: f64,
}

/// The cluster-merge engine. Construction validates the configuration, so a
/// held engine is always safe to run.
pub struct FlexibleNms {
    config: NmsConfig,
}

impl FlexibleNms {
    pub fn new(config: NmsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NmsConfig {
        &self.config
    }

    /// Process one image's detections in place.
    ///
    /// On return every non-suppressed box carries the consensus geometry and
    /// agreement-rescored confidence of everything merged into it, and every
    /// redundant detection is marked suppressed. Boxes are never removed, so
    /// indices stay stable throughout.
    pub fn process(&self, boxes: &mut [BBox]) {
        // Stable sort: equal confidences keep their input order, which makes
        // anchor selection deterministic for ties.
        boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let n = boxes.len();
        let mut candidates: Vec<MergeCandidate> = Vec::new();

        for i in 0..n {
            if boxes[i].suppressed {
                continue;
            }

            candidates.clear();
            candidates.push(MergeCandidate {
                index: i,
                weight: boxes[i].confidence.powf(self.config.merge_exponent),
            });

            for j in (i + 1)..n {
                if boxes[j].suppressed {
                    continue;
                }

                let overlap = boxes[i].iou(&boxes[j]);

                if overlap > self.config.merge_threshold {
                    candidates.push(MergeCandidate {
                        index: j,
                        weight: boxes[j].confidence.powf(self.config.merge_exponent),
                    });
                    boxes[j].suppressed = true;
                } else if overlap > self.config.suppress_threshold {
                    // Soft suppression: keep the box but shrink its
                    // confidence. The decayed value persists and shapes the
                    // box's own later turn as anchor or candidate.
                    boxes[j].confidence *=
                        (-overlap.powi(2) / self.config.decay_sigma).exp();
                }
            }

            if candidates.len() > 1 {
                self.fuse_geometry(boxes, &candidates, i);
            }
            self.rescale_confidence(boxes, &candidates, i);
        }
    }

    /// Overwrite the anchor's geometry with the weighted average of every
    /// candidate's coordinates. Total weight is at least the anchor's own,
    /// so the division is always defined.
    fn fuse_geometry(&self, boxes: &mut [BBox], candidates: &[MergeCandidate], anchor: usize) {
        let mut x0 = 0.0;
        let mut y0 = 0.0;
        let mut x1 = 0.0;
        let mut y1 = 0.0;
        let mut total_weight = 0.0;

        for candidate in candidates {
            let b = &boxes[candidate.index];
            total_weight += candidate.weight;
            x0 += b.x0 * candidate.weight;
            y0 += b.y0 * candidate.weight;
            x1 += b.x1 * candidate.weight;
            y1 += b.y1 * candidate.weight;
        }

        let anchor = &mut boxes[anchor];
        anchor.x0 = x0 / total_weight;
        anchor.y0 = y0 / total_weight;
        anchor.x1 = x1 / total_weight;
        anchor.y1 = y1 / total_weight;
    }

    /// Agreement rescoring: sum the current (post-decay) confidences of the
    /// first `ensemble_size` candidates and divide by the full ensemble
    /// size, not by the number summed. A box every pass agreed on scores
    /// near its per-pass confidence; one seen by a minority scores low.
    fn rescale_confidence(
        &self,
        boxes: &mut [BBox],
        candidates: &[MergeCandidate],
        anchor: usize,
    ) {
        let take = candidates.len().min(self.config.ensemble_size);
        let sum: f64 = candidates[..take]
            .iter()
            .map(|c| boxes[c.index].confidence)
            .sum();
        boxes[anchor].confidence = sum / self.config.ensemble_size as f64;
    }

    /// Process every group independently. Groups share no state, so with
    /// the `parallel` feature they run as a rayon parallel map; the caller
    /// sees identical results either way.
    pub fn process_groups(&self, groups: &mut [ImageGroup]) {
        #[cfg(feature = "parallel")]
        groups
            .par_iter_mut()
            .for_each(|group| self.process(&mut group.boxes));

        #[cfg(not(feature = "parallel"))]
        for group in groups.iter_mut() {
            self.process(&mut group.boxes);
        }
    }
}
