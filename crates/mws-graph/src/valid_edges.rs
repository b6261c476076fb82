use log::{debug, warn};
use mws_core::{Error, Layout, OffsetGraph, Tensor};
use rand::Rng;

use crate::affinity::compute_affinities;
use crate::bounds::{contains, inside_ranges};

/// Subsampling of repulsive edges.
///
/// With `randomize == false` only repulsive edges whose source voxel lies on
/// the lattice `v_j % strides[j] == 0` are kept. With `randomize == true`
/// every repulsive edge is kept independently with probability
/// `1 / prod(strides)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrideSpec {
    pub strides: Vec<usize>,
    pub randomize: bool,
}

impl StrideSpec {
    pub fn lattice(strides: Vec<usize>) -> Self {
        Self {
            strides,
            randomize: false,
        }
    }

    pub fn random(strides: Vec<usize>) -> Self {
        Self {
            strides,
            randomize: true,
        }
    }

    pub fn keep_probability(&self) -> f64 {
        let denom: f64 = self.strides.iter().map(|&s| s as f64).product();
        1.0 / denom
    }

    fn validate(&self, ndim: usize) -> Result<(), Error> {
        if self.strides.len() != ndim {
            return Err(Error::DimensionMismatch {
                expected: ndim,
                actual: self.strides.len(),
            });
        }
        if self.strides.contains(&0) {
            return Err(Error::InvalidStride);
        }
        Ok(())
    }
}

/// Computes the mask of edges that take part in clustering.
///
/// `edge_shape` is `(C, d1, .., dn)`. An edge `(c, v)` is valid when
/// - `v + offsets[c]` lies inside the grid,
/// - for repulsive channels, it survives `strides` subsampling,
/// - neither endpoint changes `exclude` membership and `v` is not excluded.
///
/// Every stage only removes edges, so the result does not depend on stage
/// order. `rng` is only drawn from when `strides.randomize` is set.
pub fn compute_valid_edges<R: Rng + ?Sized>(
    edge_shape: &[usize],
    graph: &OffsetGraph,
    strides: Option<&StrideSpec>,
    exclude: Option<&Tensor<bool>>,
    rng: &mut R,
) -> Result<Tensor<bool>, Error> {
    let grid_shape = graph.grid_shape(edge_shape)?;
    let layout = Layout::new(grid_shape)?;

    if let Some(spec) = strides {
        spec.validate(graph.ndim())?;
    }
    if let Some(mask) = exclude
        && mask.shape() != grid_shape
    {
        return Err(Error::ShapeMismatch {
            expected: grid_shape.to_vec(),
            actual: mask.shape().to_vec(),
        });
    }

    let mut valid = Tensor::new_fill(edge_shape, true);
    invalidate_boundaries(&mut valid, graph, &layout);

    if let Some(spec) = strides {
        if spec.randomize {
            invalidate_random_strides(&mut valid, graph, spec, rng);
        } else {
            invalidate_lattice_strides(&mut valid, graph, &layout, &spec.strides);
        }
    }

    if let Some(mask) = exclude {
        invalidate_excluded(&mut valid, graph, mask)?;
    }

    debug!(
        "valid edges: {} of {} ({} channels, grid {:?})",
        valid.data().iter().filter(|&&v| v).count(),
        valid.len(),
        graph.num_channels(),
        grid_shape
    );

    Ok(valid)
}

fn invalidate_boundaries(valid: &mut Tensor<bool>, graph: &OffsetGraph, layout: &Layout) {
    for (c, offset) in graph.offsets().iter().enumerate() {
        if offset.iter().all(|&o| o == 0) {
            continue;
        }

        let ranges = inside_ranges(layout, offset);
        let channel = valid.channel_mut(c).expect("channel index in range");
        layout.for_each_coord(|flat, coords| {
            if !contains(&ranges, coords) {
                channel[flat] = false;
            }
        });
    }
}

fn invalidate_lattice_strides(
    valid: &mut Tensor<bool>,
    graph: &OffsetGraph,
    layout: &Layout,
    strides: &[usize],
) {
    if strides.iter().all(|&s| s == 1) {
        return;
    }

    let on_lattice: Vec<bool> = {
        let mut keep = vec![false; layout.len()];
        layout.for_each_coord(|flat, coords| {
            keep[flat] = coords.iter().zip(strides).all(|(&x, &s)| x % s == 0);
        });
        keep
    };

    for c in graph.num_attractive()..graph.num_channels() {
        let channel = valid.channel_mut(c).expect("channel index in range");
        for (v, &keep) in channel.iter_mut().zip(&on_lattice) {
            *v &= keep;
        }
    }
}

fn invalidate_random_strides<R: Rng + ?Sized>(
    valid: &mut Tensor<bool>,
    graph: &OffsetGraph,
    spec: &StrideSpec,
    rng: &mut R,
) {
    let p = spec.keep_probability();
    if p <= 0.0 {
        warn!(
            "stride keep probability underflows for strides {:?}; dropping all repulsive edges",
            spec.strides
        );
    }

    for c in graph.num_attractive()..graph.num_channels() {
        let channel = valid.channel_mut(c).expect("channel index in range");
        for v in channel.iter_mut() {
            // One draw per entry, valid or not.
            let keep = rng.gen_bool(p.clamp(0.0, 1.0));
            *v &= keep;
        }
    }
}

fn invalidate_excluded(
    valid: &mut Tensor<bool>,
    graph: &OffsetGraph,
    exclude: &Tensor<bool>,
) -> Result<(), Error> {
    // Affinity 0 marks a membership change (or an out-of-grid target).
    let (transitions, _) = compute_affinities(exclude, graph.offsets(), None)?;
    for (v, &aff) in valid.data_mut().iter_mut().zip(transitions.data()) {
        if aff == 0.0 {
            *v = false;
        }
    }

    let excluded = exclude.data();
    for c in 0..graph.num_channels() {
        let channel = valid.channel_mut(c).expect("channel index in range");
        for (v, &ex) in channel.iter_mut().zip(excluded) {
            if ex {
                *v = false;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use mws_core::{Error, OffsetGraph, Tensor};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{StrideSpec, compute_valid_edges};

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn as_u8(mask: &[bool]) -> Vec<u8> {
        mask.iter().map(|&v| u8::from(v)).collect()
    }

    #[test]
    fn positive_offset_drops_trailing_slices() {
        let graph = OffsetGraph::new(vec![vec![0, 2]], 1).expect("valid offsets");
        let valid = compute_valid_edges(&[1, 3, 5], &graph, None, None, &mut rng())
            .expect("valid edges");

        for y in 0..3 {
            let row: Vec<bool> = (0..5)
                .map(|x| *valid.get(&[0, y, x]).expect("in bounds"))
                .collect();
            assert_eq!(row, vec![true, true, true, false, false]);
        }
    }

    #[test]
    fn negative_offset_drops_leading_slices() {
        let graph = OffsetGraph::new(vec![vec![-2, 0]], 1).expect("valid offsets");
        let valid = compute_valid_edges(&[1, 4, 3], &graph, None, None, &mut rng())
            .expect("valid edges");

        for y in 0..4 {
            for x in 0..3 {
                let expected = y >= 2;
                assert_eq!(valid.get(&[0, y, x]), Some(&expected), "at ({y}, {x})");
            }
        }
    }

    #[test]
    fn zero_offset_keeps_channel() {
        let graph = OffsetGraph::new(vec![vec![0, 0], vec![1, 0]], 1).expect("valid offsets");
        let valid = compute_valid_edges(&[2, 3, 3], &graph, None, None, &mut rng())
            .expect("valid edges");

        assert!(valid.channel(0).expect("channel 0").iter().all(|&v| v));
        assert_eq!(
            as_u8(valid.channel(1).expect("channel 1")),
            vec![1, 1, 1, 1, 1, 1, 0, 0, 0]
        );
    }

    #[test]
    fn offset_longer_than_axis_invalidates_channel() {
        let graph = OffsetGraph::new(vec![vec![4]], 0).expect("valid offsets");
        let valid = compute_valid_edges(&[1, 3], &graph, None, None, &mut rng())
            .expect("valid edges");
        assert!(valid.data().iter().all(|&v| !v));
    }

    #[test]
    fn lattice_strides_spare_attractive_channels() {
        let graph =
            OffsetGraph::new(vec![vec![0, 0], vec![0, 0], vec![0, 0]], 1).expect("valid offsets");
        let spec = StrideSpec::lattice(vec![2, 3]);
        let valid = compute_valid_edges(&[3, 4, 6], &graph, Some(&spec), None, &mut rng())
            .expect("valid edges");

        assert!(valid.channel(0).expect("attractive").iter().all(|&v| v));
        for c in 1..3 {
            for y in 0..4 {
                for x in 0..6 {
                    let expected = y % 2 == 0 && x % 3 == 0;
                    assert_eq!(valid.get(&[c, y, x]), Some(&expected));
                }
            }
        }
    }

    #[test]
    fn lattice_strides_are_reproducible() {
        let graph = OffsetGraph::new(vec![vec![-1, 0], vec![-3, -3]], 1).expect("valid offsets");
        let spec = StrideSpec::lattice(vec![2, 2]);

        let a = compute_valid_edges(&[2, 8, 8], &graph, Some(&spec), None, &mut rng())
            .expect("valid edges");
        let mut other_rng = ChaCha8Rng::seed_from_u64(12345);
        let b = compute_valid_edges(&[2, 8, 8], &graph, Some(&spec), None, &mut other_rng)
            .expect("valid edges");
        assert_eq!(a, b);
    }

    #[test]
    fn random_strides_follow_seed_and_rate() {
        let graph = OffsetGraph::new(vec![vec![0, 0], vec![0, 0]], 1).expect("valid offsets");
        let spec = StrideSpec::random(vec![2, 2]);
        let shape = [2, 64, 64];

        let a = compute_valid_edges(&shape, &graph, Some(&spec), None, &mut rng())
            .expect("valid edges");
        let b = compute_valid_edges(&shape, &graph, Some(&spec), None, &mut rng())
            .expect("valid edges");
        assert_eq!(a, b);

        assert!(a.channel(0).expect("attractive").iter().all(|&v| v));
        let kept = a
            .channel(1)
            .expect("repulsive")
            .iter()
            .filter(|&&v| v)
            .count();
        let rate = kept as f64 / (64.0 * 64.0);
        assert!((rate - 0.25).abs() < 0.05, "rate={rate}");
    }

    #[test]
    fn exclusion_mask_drops_sources_and_transitions() {
        let graph = OffsetGraph::new(vec![vec![1], vec![-1]], 2).expect("valid offsets");
        let exclude =
            Tensor::from_vec(&[5], vec![false, false, true, false, false]).expect("valid mask");

        let valid = compute_valid_edges(&[2, 5], &graph, None, Some(&exclude), &mut rng())
            .expect("valid edges");

        // +1: 1->2 enters the mask, 2->3 starts inside it, 4 leaves the grid.
        assert_eq!(
            as_u8(valid.channel(0).expect("channel 0")),
            vec![1, 0, 0, 1, 0]
        );
        // -1: 0 leaves the grid, 2->1 starts inside, 3->2 enters the mask.
        assert_eq!(
            as_u8(valid.channel(1).expect("channel 1")),
            vec![0, 1, 0, 0, 1]
        );
    }

    #[test]
    fn rejects_bad_mask_and_strides() {
        let graph = OffsetGraph::new(vec![vec![1, 0]], 1).expect("valid offsets");
        let mask = Tensor::new_fill(&[3, 4], false);

        let err = compute_valid_edges(&[1, 4, 4], &graph, None, Some(&mask), &mut rng())
            .expect_err("mask shape differs from grid");
        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: vec![4, 4],
                actual: vec![3, 4]
            }
        );

        let spec = StrideSpec::lattice(vec![2]);
        let err = compute_valid_edges(&[1, 4, 4], &graph, Some(&spec), None, &mut rng())
            .expect_err("stride rank differs from grid");
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );

        let spec = StrideSpec::lattice(vec![2, 0]);
        let err = compute_valid_edges(&[1, 4, 4], &graph, Some(&spec), None, &mut rng())
            .expect_err("zero stride");
        assert_eq!(err, Error::InvalidStride);
    }
}
