//! Flexible Non-Maximum Suppression Library
//!
//! Post-processing for bounding-box detections collected from several
//! inference passes (test-time augmentation or model ensembles) over the
//! same images. Instead of discarding every overlapping detection except
//! the strongest, the engine fuses strongly-overlapping boxes into one
//! consensus box and rescores it by how much of the ensemble agreed on it.

pub mod bbox;
pub mod config;
pub mod group;
pub mod nms;

// Re-export commonly used types
pub use bbox::BBox;
pub use config::{ConfigError, NmsConfig};
pub use group::ImageGroup;
pub use nms::FlexibleNms;
