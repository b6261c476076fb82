use log::debug;
use mws_core::Error;

use crate::mutex::{EdgeOutcome, MutexWatershed};

/// Mutex watershed on an explicit graph.
///
/// `edges` / `weights` are the attractive edges, `mutex_edges` /
/// `mutex_weights` the repulsive ones. All edges are processed by descending
/// weight; on equal weight attractive edges come first, then input order.
pub fn cluster_edge_list(
    num_nodes: usize,
    edges: &[(usize, usize)],
    weights: &[f32],
    mutex_edges: &[(usize, usize)],
    mutex_weights: &[f32],
) -> Result<Vec<u64>, Error> {
    if weights.len() != edges.len() {
        return Err(Error::SizeMismatch {
            expected: edges.len(),
            actual: weights.len(),
        });
    }
    if mutex_weights.len() != mutex_edges.len() {
        return Err(Error::SizeMismatch {
            expected: mutex_edges.len(),
            actual: mutex_weights.len(),
        });
    }
    if edges
        .iter()
        .chain(mutex_edges)
        .any(|&(u, v)| u >= num_nodes || v >= num_nodes)
    {
        return Err(Error::OutOfBounds);
    }

    let num_attractive = edges.len();
    // Adding 0.0 maps -0.0 to 0.0 so signed zeros tie.
    let weight_of = |i: usize| {
        if i < num_attractive {
            weights[i] + 0.0
        } else {
            mutex_weights[i - num_attractive] + 0.0
        }
    };

    let mut order: Vec<usize> = (0..num_attractive + mutex_edges.len()).collect();
    order.sort_by(|&a, &b| weight_of(b).total_cmp(&weight_of(a)));

    let mut mws = MutexWatershed::new(num_nodes);
    let (mut merges, mut mutexes) = (0usize, 0usize);

    for i in order {
        let is_mutex = i >= num_attractive;
        let (u, v) = if is_mutex {
            mutex_edges[i - num_attractive]
        } else {
            edges[i]
        };
        match mws.add_edge(u, v, is_mutex) {
            EdgeOutcome::Merged => merges += 1,
            EdgeOutcome::MutexAdded => mutexes += 1,
            EdgeOutcome::Connected | EdgeOutcome::Constrained => {}
        }
    }

    debug!(
        "edge list mws: {num_nodes} nodes, {} edges, {merges} merges, {mutexes} mutex constraints",
        num_attractive + mutex_edges.len()
    );

    Ok(mws.into_labels())
}

#[cfg(test)]
mod tests {
    use mws_core::Error;

    use super::cluster_edge_list;

    #[test]
    fn triangle_with_strong_mutex() {
        let edges = [(0, 1), (1, 2)];
        let weights = [0.9, 0.4];
        let labels = cluster_edge_list(3, &edges, &weights, &[(0, 2)], &[0.6]).expect("labels");

        assert_eq!(labels[0], labels[1]);
        assert_ne!(labels[1], labels[2]);
    }

    #[test]
    fn weak_mutex_is_overruled() {
        let edges = [(0, 1), (1, 2)];
        let weights = [0.9, 0.7];
        let labels = cluster_edge_list(3, &edges, &weights, &[(0, 2)], &[0.6]).expect("labels");

        assert!(labels.iter().all(|&l| l == labels[0]));
    }

    #[test]
    fn attractive_wins_ties() {
        let labels =
            cluster_edge_list(2, &[(0, 1)], &[0.5], &[(1, 0)], &[0.5]).expect("labels");
        assert_eq!(labels[0], labels[1]);
    }

    #[test]
    fn signed_zero_weights_tie() {
        let labels =
            cluster_edge_list(2, &[(0, 1)], &[-0.0], &[(0, 1)], &[0.0]).expect("labels");
        assert_eq!(labels[0], labels[1]);
    }

    #[test]
    fn isolated_nodes_keep_their_own_label() {
        let labels = cluster_edge_list(4, &[(0, 1)], &[1.0], &[], &[]).expect("labels");
        assert_eq!(labels[0], labels[1]);
        assert_ne!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            cluster_edge_list(2, &[(0, 1)], &[], &[], &[]),
            Err(Error::SizeMismatch {
                expected: 1,
                actual: 0
            })
        );
        assert_eq!(
            cluster_edge_list(2, &[], &[], &[(0, 1)], &[0.1, 0.2]),
            Err(Error::SizeMismatch {
                expected: 1,
                actual: 2
            })
        );
        assert_eq!(
            cluster_edge_list(2, &[(0, 2)], &[0.5], &[], &[]),
            Err(Error::OutOfBounds)
        );
    }
}
