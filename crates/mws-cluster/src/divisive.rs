use log::debug;
use mws_core::{Error, OffsetGraph};

use crate::{EdgeLattice, UnionFind};
use crate::mutex::MutexWatershed;

/// Divisive mutex watershed over a grid graph.
///
/// Phase one walks `order` like [`crate::cluster_kruskal`], but attractive
/// edges merge even across a mutex. Only merges that were not constrained are
/// recorded in a spanning forest. The walk stops once a single cluster is
/// left. Phase two labels the connected components of the recorded forest, so
/// every constrained merge becomes a cut.
pub fn cluster_divisive(
    order: &[usize],
    valid_edges: &[bool],
    graph: &OffsetGraph,
    grid_shape: &[usize],
) -> Result<Vec<u64>, Error> {
    let lattice = EdgeLattice::new(graph, grid_shape)?;
    lattice.check_len(valid_edges.len())?;

    let num_nodes = lattice.num_nodes();
    let mut forest = vec![false; lattice.num_attractive_edges()];
    let mut clusters = num_nodes;
    let (mut free_merges, mut forced_merges, mut mutexes) = (0usize, 0usize, 0usize);

    let mut mws = MutexWatershed::new(num_nodes);
    for &edge in order {
        if clusters <= 1 {
            break;
        }
        if !*valid_edges.get(edge).ok_or(Error::OutOfBounds)? {
            continue;
        }
        let Some((u, v)) = lattice.endpoints(edge) else {
            continue;
        };

        let ru = mws.find(u);
        let rv = mws.find(v);
        if ru == rv {
            continue;
        }

        let constrained = mws.is_constrained(ru, rv);
        if lattice.is_mutex(edge) {
            if !constrained {
                mws.insert_mutex(ru, rv);
                mutexes += 1;
            }
            continue;
        }

        if constrained {
            forced_merges += 1;
        } else {
            forest[edge] = true;
            free_merges += 1;
        }
        mws.merge_roots(ru, rv);
        clusters -= 1;
    }

    debug!(
        "divisive mws: {num_nodes} nodes, {free_merges} forest edges, \
         {forced_merges} cuts, {mutexes} mutex constraints"
    );

    let mut uf = UnionFind::new(num_nodes);
    for (edge, _) in forest.iter().enumerate().filter(|(_, in_forest)| **in_forest) {
        if let Some((u, v)) = lattice.endpoints(edge) {
            uf.union(u, v);
        }
    }

    Ok(uf.labels())
}
