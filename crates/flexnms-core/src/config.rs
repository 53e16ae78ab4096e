//! Engine configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning knobs for the cluster-merge engine.
///
/// All thresholds operate on inclusive-pixel IoU values in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NmsConfig {
    /// Overlap above which a box is fused into the anchor and suppressed.
    pub merge_threshold: f64,
    /// Overlap above which a non-fused box has its confidence softly
    /// decayed. Must stay strictly below `merge_threshold`.
    pub suppress_threshold: f64,
    /// Exponent applied to confidence when weighting geometry fusion;
    /// higher values let high-confidence boxes dominate the fused shape.
    pub merge_exponent: f64,
    /// Softness of the Gaussian confidence decay, `exp(-iou^2 / sigma)`.
    pub decay_sigma: f64,
    /// Expected number of independent detector passes per image; the
    /// divisor of the agreement rescoring.
    pub ensemble_size: usize,
}

/// Configuration validation errors, reported before any processing starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ensemble size must be at least 1")]
    ZeroEnsembleSize,
    #[error("suppress threshold {suppress} must be below merge threshold {merge}")]
    ThresholdOrder { suppress: f64, merge: f64 },
    #[error("decay sigma must be positive, got {0}")]
    NonPositiveSigma(f64),
}

impl NmsConfig {
    /// Check the configuration for values that would make processing
    /// meaningless or divide by zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ensemble_size == 0 {
            return Err(ConfigError::ZeroEnsembleSize);
        }
        if self.suppress_threshold >= self.merge_threshold {
            return Err(ConfigError::ThresholdOrder {
                suppress: self.suppress_threshold,
                merge: self.merge_threshold,
            });
        }
        if self.decay_sigma <= 0.0 {
            return Err(ConfigError::NonPositiveSigma(self.decay_sigma));
        }
        Ok(())
    }
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            merge_threshold: 0.75,
            suppress_threshold: 0.3,
            merge_exponent: 4.0,
            decay_sigma: 2.0,
            ensemble_size: 1,
        }
    }
}
