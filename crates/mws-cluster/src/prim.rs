use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;
use mws_core::{Error, OffsetGraph};

use crate::EdgeLattice;
use crate::mutex::{EdgeOutcome, MutexWatershed};

#[derive(Debug, Clone, Copy)]
struct Candidate {
    weight: f32,
    edge: usize,
    from: usize,
    to: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Max-heap on weight; equal weights pop the lower edge id first. Adding
    // 0.0 maps -0.0 to 0.0 so signed zeros tie.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.weight + 0.0)
            .total_cmp(&(other.weight + 0.0))
            .then_with(|| other.edge.cmp(&self.edge))
            .then_with(|| other.from.cmp(&self.from))
    }
}

struct PrimGrowth<'a> {
    lattice: &'a EdgeLattice,
    weights: &'a [f32],
    valid_edges: &'a [bool],
    visited: Vec<bool>,
    reached: Vec<bool>,
    heap: BinaryHeap<Candidate>,
    mws: MutexWatershed,
}

impl PrimGrowth<'_> {
    /// Pushes every unvisited valid edge incident to `node`, in both offset
    /// directions, whose other endpoint is not yet in the same cluster.
    fn expand(&mut self, node: usize) {
        if self.reached[node] {
            return;
        }
        self.reached[node] = true;

        let lattice = self.lattice;
        let root = self.mws.find(node);
        let num_nodes = lattice.num_nodes();

        for (channel, &stride) in lattice.offset_strides().iter().enumerate() {
            let out_edge = lattice.edge_id(channel, node);
            if self.valid_edges[out_edge]
                && !self.visited[out_edge]
                && let Some(target) = node.checked_add_signed(stride)
                && target < num_nodes
                && self.mws.find(target) != root
            {
                self.push(out_edge, node, target);
            }

            let Some(source) = stride
                .checked_neg()
                .and_then(|back| node.checked_add_signed(back))
            else {
                continue;
            };
            if source >= num_nodes {
                continue;
            }
            let in_edge = lattice.edge_id(channel, source);
            if self.valid_edges[in_edge]
                && !self.visited[in_edge]
                && self.mws.find(source) != root
            {
                self.push(in_edge, node, source);
            }
        }
    }

    fn push(&mut self, edge: usize, from: usize, to: usize) {
        self.heap.push(Candidate {
            weight: self.weights[edge],
            edge,
            from,
            to,
        });
    }

    fn grow_from(&mut self, seed: usize) -> (usize, usize) {
        let (mut merges, mut mutexes) = (0usize, 0usize);
        self.expand(seed);

        while let Some(c) = self.heap.pop() {
            if self.visited[c.edge] {
                continue;
            }
            self.visited[c.edge] = true;

            match self
                .mws
                .add_edge(c.from, c.to, self.lattice.is_mutex(c.edge))
            {
                EdgeOutcome::Connected | EdgeOutcome::Constrained => continue,
                EdgeOutcome::Merged => merges += 1,
                EdgeOutcome::MutexAdded => mutexes += 1,
            }
            self.expand(c.to);
        }

        (merges, mutexes)
    }
}

/// Mutex watershed grown with Prim-style priority queues over raw weights.
///
/// Growth starts at voxel 0 and follows the heaviest available edge. Voxels
/// that cannot be reached through valid edges start their own growth, in
/// ascending voxel order, so masked-off parts of the grid are processed too.
pub fn cluster_prim(
    weights: &[f32],
    valid_edges: &[bool],
    graph: &OffsetGraph,
    grid_shape: &[usize],
) -> Result<Vec<u64>, Error> {
    let lattice = EdgeLattice::new(graph, grid_shape)?;
    lattice.check_len(weights.len())?;
    lattice.check_len(valid_edges.len())?;

    let num_nodes = lattice.num_nodes();
    let mut growth = PrimGrowth {
        lattice: &lattice,
        weights,
        valid_edges,
        visited: vec![false; lattice.num_edges()],
        reached: vec![false; num_nodes],
        heap: BinaryHeap::new(),
        mws: MutexWatershed::new(num_nodes),
    };

    let (mut merges, mut mutexes, mut seeds) = (0usize, 0usize, 0usize);
    for seed in 0..num_nodes {
        if growth.reached[seed] {
            continue;
        }
        let (m, x) = growth.grow_from(seed);
        merges += m;
        mutexes += x;
        seeds += 1;
    }

    debug!(
        "prim mws: {num_nodes} nodes, {seeds} seeds, {merges} merges, {mutexes} mutex constraints"
    );

    Ok(growth.mws.into_labels())
}
