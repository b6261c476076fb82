use log::debug;
use mws_core::{Error, OffsetGraph};

use crate::EdgeLattice;
use crate::mutex::{EdgeOutcome, MutexWatershed};

/// Mutex watershed over a grid graph, processing edges in `order`.
///
/// `order` holds flat edge indices by descending priority; entries marked
/// invalid in `valid_edges` are skipped, so the tail of invalid edges produced
/// by the priority orderer is harmless. Returns one label per voxel.
pub fn cluster_kruskal(
    order: &[usize],
    valid_edges: &[bool],
    graph: &OffsetGraph,
    grid_shape: &[usize],
) -> Result<Vec<u64>, Error> {
    let lattice = EdgeLattice::new(graph, grid_shape)?;
    lattice.check_len(valid_edges.len())?;

    let mut mws = MutexWatershed::new(lattice.num_nodes());
    let (mut merges, mut mutexes) = (0usize, 0usize);

    for &edge in order {
        if !*valid_edges.get(edge).ok_or(Error::OutOfBounds)? {
            continue;
        }
        let Some((u, v)) = lattice.endpoints(edge) else {
            continue;
        };

        match mws.add_edge(u, v, lattice.is_mutex(edge)) {
            EdgeOutcome::Merged => merges += 1,
            EdgeOutcome::MutexAdded => mutexes += 1,
            EdgeOutcome::Connected | EdgeOutcome::Constrained => {}
        }
    }

    debug!(
        "kruskal mws: {} nodes, {merges} merges, {mutexes} mutex constraints",
        lattice.num_nodes()
    );

    Ok(mws.into_labels())
}
