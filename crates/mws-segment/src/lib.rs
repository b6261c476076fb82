//! Mutex watershed segmentation of affinity tensors.
//!
//! [`compute_segmentation`] runs the full pipeline on a `(C, d1, .., dn)`
//! weight tensor: valid-edge mask, weight transform, priority ordering,
//! clustering and label post-processing. [`compute_sorted_priority_and_valid_edges`]
//! stops before clustering.
//!
//! Behavior is controlled by [`SegmentationConfig`], which can be
//! deserialized from JSON.

mod algorithm;
mod config;
mod driver;

pub use algorithm::Algorithm;
pub use config::SegmentationConfig;
pub use driver::{
    compute_segmentation, compute_segmentation_with_rng, compute_sorted_priority_and_valid_edges,
};
