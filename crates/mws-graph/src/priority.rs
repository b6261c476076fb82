use mws_core::{Error, Tensor};

/// Priority ordering over a flat edge tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityOrder {
    /// Flattened valid-edge mask, indexed like the weight tensor.
    pub valid_edges: Vec<bool>,
    /// All flat edge indices: the first `num_valid` are the valid edges by
    /// descending weight, the rest are invalid edges in ascending order.
    pub order: Vec<usize>,
    pub num_valid: usize,
}

impl PriorityOrder {
    /// Valid edges by descending priority.
    pub fn valid_order(&self) -> &[usize] {
        &self.order[..self.num_valid]
    }
}

/// Ranks valid edges by descending weight.
///
/// Equal weights keep ascending flat index order. Invalid edges never compete
/// with valid ones; they are appended after the last valid edge.
pub fn sorted_order(weights: &Tensor<f32>, valid: &Tensor<bool>) -> Result<PriorityOrder, Error> {
    if weights.shape() != valid.shape() {
        return Err(Error::ShapeMismatch {
            expected: weights.shape().to_vec(),
            actual: valid.shape().to_vec(),
        });
    }

    let w = weights.data();
    let mask = valid.data();

    let (mut order, invalid): (Vec<usize>, Vec<usize>) = (0..w.len()).partition(|&i| mask[i]);
    let num_valid = order.len();

    // Stable sort: ties stay in ascending index order. Adding 0.0 maps -0.0
    // to 0.0 so signed zeros tie.
    order.sort_by(|&a, &b| (w[b] + 0.0).total_cmp(&(w[a] + 0.0)));
    order.extend(invalid);

    Ok(PriorityOrder {
        valid_edges: mask.to_vec(),
        order,
        num_valid,
    })
}

#[cfg(test)]
mod tests {
    use mws_core::{Error, Tensor};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::sorted_order;

    #[test]
    fn valid_edges_sorted_descending() {
        let weights =
            Tensor::from_vec(&[2, 3], vec![0.1, 0.9, 0.5, 0.7, 0.3, 0.8]).expect("valid tensor");
        let valid =
            Tensor::from_vec(&[2, 3], vec![true, true, true, false, true, true]).expect("mask");

        let p = sorted_order(&weights, &valid).expect("sorted");

        assert_eq!(p.num_valid, 5);
        assert_eq!(p.valid_order(), &[1, 5, 2, 4, 0]);
        assert_eq!(p.order, vec![1, 5, 2, 4, 0, 3]);
        assert_eq!(p.valid_edges, valid.data());
    }

    #[test]
    fn ties_keep_ascending_index() {
        let weights = Tensor::from_vec(&[6], vec![0.5, 0.7, 0.5, 0.7, 0.5, 0.1]).expect("tensor");
        let valid = Tensor::new_fill(&[6], true);

        let p = sorted_order(&weights, &valid).expect("sorted");
        assert_eq!(p.order, vec![1, 3, 0, 2, 4, 5]);
    }

    #[test]
    fn signed_zeros_tie() {
        let valid = Tensor::new_fill(&[2], true);

        let weights = Tensor::from_vec(&[2], vec![-0.0f32, 0.0]).expect("tensor");
        let p = sorted_order(&weights, &valid).expect("sorted");
        assert_eq!(p.order, vec![0, 1]);

        let weights = Tensor::from_vec(&[2], vec![0.0f32, -0.0]).expect("tensor");
        let p = sorted_order(&weights, &valid).expect("sorted");
        assert_eq!(p.order, vec![0, 1]);
    }

    #[test]
    fn invalid_entries_never_precede_valid_ones() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let n = 500;
        let w: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..2.0)).collect();
        let m: Vec<bool> = (0..n).map(|_| rng.gen_bool(0.6)).collect();
        let weights = Tensor::from_vec(&[5, 100], w.clone()).expect("tensor");
        let valid = Tensor::from_vec(&[5, 100], m.clone()).expect("mask");

        let p = sorted_order(&weights, &valid).expect("sorted");

        assert_eq!(p.order.len(), n);
        assert!(p.order[..p.num_valid].iter().all(|&i| m[i]));
        assert!(p.order[p.num_valid..].iter().all(|&i| !m[i]));
        for pair in p.valid_order().windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(w[a] > w[b] || (w[a] == w[b] && a < b), "a={a} b={b}");
        }
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let weights = Tensor::new_fill(&[2, 3], 0.0f32);
        let valid = Tensor::new_fill(&[3, 2], true);
        assert_eq!(
            sorted_order(&weights, &valid),
            Err(Error::ShapeMismatch {
                expected: vec![2, 3],
                actual: vec![3, 2]
            })
        );
    }
}
