//! Mutex watershed clustering primitives.
//!
//! The grid primitives consume the flat, channel-major edge layout produced by
//! `mws-graph`: edge `e` connects voxel `u = e % N` to `u + offset_stride[e / N]`
//! where `N` is the number of voxels. Edges of channels below
//! [`mws_core::OffsetGraph::num_attractive`] are attractive (merge), the rest
//! are mutex edges (forbid merging).
//!
//! Variants:
//! - [`cluster_kruskal`]: process edges in a given priority order; attractive
//!   edges merge unless a mutex separates the clusters, mutex edges add a
//!   constraint.
//! - [`cluster_divisive`]: attractive edges always merge; only unconstrained
//!   merges are kept as a spanning forest whose components form the output.
//! - [`cluster_prim`]: grow clusters from seed voxels with a priority queue
//!   over raw weights.
//! - [`cluster_edge_list`]: mutex watershed on an explicit graph.
//!
//! Labels are union-find representatives (voxel indices). Use
//! [`relabel_consecutive`] for compact ids.

mod divisive;
mod edge_list;
mod kruskal;
mod lattice;
mod mutex;
mod prim;
mod relabel;
mod union_find;

pub use divisive::cluster_divisive;
pub use edge_list::cluster_edge_list;
pub use kruskal::cluster_kruskal;
pub use lattice::EdgeLattice;
pub use prim::cluster_prim;
pub use relabel::relabel_consecutive;
pub use union_find::UnionFind;
