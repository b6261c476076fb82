use std::time::Instant;

use log::debug;
use mws_cluster::{cluster_divisive, cluster_kruskal, cluster_prim};
use mws_core::{Error, OffsetGraph, Tensor};
use mws_graph::{PriorityOrder, StrideSpec, compute_valid_edges, sorted_order, transform_weights};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Algorithm, SegmentationConfig};

/// Valid-edge mask and priority order of a weight tensor, without clustering.
///
/// `weights` has shape `(C, d1, .., dn)` and is left untouched; the priority
/// order is computed on a transformed copy.
pub fn compute_sorted_priority_and_valid_edges<R: Rng + ?Sized>(
    weights: &Tensor<f32>,
    graph: &OffsetGraph,
    strides: Option<&StrideSpec>,
    invert_repulsive_weights: bool,
    bias_cut: f32,
    rng: &mut R,
) -> Result<PriorityOrder, Error> {
    graph.grid_shape(weights.shape())?;

    let valid = compute_valid_edges(weights.shape(), graph, strides, None, rng)?;

    let mut transformed = weights.clone();
    transform_weights(
        &mut transformed,
        graph.num_attractive(),
        invert_repulsive_weights,
        bias_cut,
    )?;

    sorted_order(&transformed, &valid)
}

/// Segments a `(C, d1, .., dn)` weight tensor into a `(d1, .., dn)` label map.
///
/// With `valid_region`, voxels outside the region get label `0` and every
/// segment inside it has a label `>= 1`. Random strides draw from a
/// [`ChaCha8Rng`] seeded with `config.seed`.
pub fn compute_segmentation(
    weights: &Tensor<f32>,
    graph: &OffsetGraph,
    config: &SegmentationConfig,
    valid_region: Option<&Tensor<bool>>,
) -> Result<Tensor<u64>, Error> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    compute_segmentation_with_rng(weights, graph, config, valid_region, &mut rng)
}

/// [`compute_segmentation`] with a caller-supplied generator for random strides.
pub fn compute_segmentation_with_rng<R: Rng + ?Sized>(
    weights: &Tensor<f32>,
    graph: &OffsetGraph,
    config: &SegmentationConfig,
    valid_region: Option<&Tensor<bool>>,
    rng: &mut R,
) -> Result<Tensor<u64>, Error> {
    let t0 = Instant::now();
    let grid_shape = graph.grid_shape(weights.shape())?;

    let exclude = valid_region.map(|region| region.map(|&inside| !inside));
    let strides = config.stride_spec();
    let valid = compute_valid_edges(
        weights.shape(),
        graph,
        strides.as_ref(),
        exclude.as_ref(),
        rng,
    )?;

    let mut transformed = weights.clone();
    transform_weights(
        &mut transformed,
        graph.num_attractive(),
        config.invert_repulsive_weights,
        config.bias_cut,
    )?;
    let prep_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let t1 = Instant::now();
    let flat = match config.algorithm {
        Algorithm::Kruskal | Algorithm::Divisive => {
            let priority = sorted_order(&transformed, &valid)?;
            debug!(
                "sorted {} valid edges in {:.3} ms",
                priority.num_valid,
                t1.elapsed().as_secs_f64() * 1000.0
            );
            if config.algorithm == Algorithm::Kruskal {
                cluster_kruskal(&priority.order, &priority.valid_edges, graph, grid_shape)?
            } else {
                cluster_divisive(&priority.order, &priority.valid_edges, graph, grid_shape)?
            }
        }
        Algorithm::Prim => cluster_prim(transformed.data(), valid.data(), graph, grid_shape)?,
    };
    let cluster_ms = t1.elapsed().as_secs_f64() * 1000.0;

    let mut labels = Tensor::from_vec(grid_shape, flat)?;

    if let Some(region) = valid_region {
        for (label, &inside) in labels.data_mut().iter_mut().zip(region.data()) {
            *label = if inside { *label + 1 } else { 0 };
        }
    }

    debug!(
        "{} segmentation of grid {:?}: prep {prep_ms:.3} ms, clustering {cluster_ms:.3} ms",
        config.algorithm, grid_shape
    );

    Ok(labels)
}
