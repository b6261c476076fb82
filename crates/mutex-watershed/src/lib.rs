//! Umbrella crate for the `mutex-watershed` workspace.
//!
//! Re-exports the tensor and offset-graph types, the edge-graph stages, the
//! clustering primitives and the segmentation driver.

pub use mws_cluster::*;
pub use mws_core::*;
pub use mws_graph::*;
pub use mws_segment::*;
