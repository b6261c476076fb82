//! Foundational primitives for affinity-graph segmentation.
//!
//! ## Tensors and Layout
//! Tensors are dense, owned and row-major: the last axis varies fastest.
//! Weight tensors carry the offset channel as their leading axis, so a
//! `(C, d1, .., dn)` tensor stores channel `c` as one contiguous block of
//! `d1 * .. * dn` elements. The flat index of edge `(c, v)` is therefore
//! `c * N + ravel(v)`.
//!
//! ## Offset Graphs
//! An [`OffsetGraph`] describes the implicit grid graph: one integer offset
//! per channel and a split point separating attractive channels `[0, k)` from
//! repulsive channels `[k, C)`. Channel `c` connects voxel `v` to
//! `v + offsets[c]`.

mod error;
mod layout;
mod offsets;
mod tensor;

pub use error::Error;
pub use layout::Layout;
pub use offsets::OffsetGraph;
pub use tensor::Tensor;
