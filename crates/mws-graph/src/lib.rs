//! Edge-graph construction and priority ordering for the mutex watershed.
//!
//! Edges live on the implicit grid graph of an [`mws_core::OffsetGraph`]:
//! entry `(c, v)` of a `(C, d1, .., dn)` tensor is the edge from voxel `v` to
//! `v + offsets[c]`.
//!
//! Stages:
//! - [`compute_valid_edges`] marks edges that stay inside the grid, survive
//!   stride subsampling of repulsive channels and do not touch an excluded
//!   region.
//! - [`transform_weights`] maps attractive and repulsive weights onto one
//!   priority scale.
//! - [`sorted_order`] ranks valid edges by descending priority.
//!
//! Random stride subsampling draws from a caller-supplied [`rand::Rng`]; no
//! stage keeps global state.

mod affinity;
mod bounds;
mod priority;
mod valid_edges;
mod weights;

pub use affinity::compute_affinities;
pub use priority::{PriorityOrder, sorted_order};
pub use valid_edges::{StrideSpec, compute_valid_edges};
pub use weights::transform_weights;
