use mws_core::{Error, Tensor};

/// Maps raw edge weights onto one priority scale, in place.
///
/// With `invert_repulsive`, repulsive weights `w` become `1 - w`. Then
/// `bias_cut` is added to every attractive weight. The transform is not
/// idempotent; apply it once per segmentation.
pub fn transform_weights(
    weights: &mut Tensor<f32>,
    num_attractive: usize,
    invert_repulsive: bool,
    bias_cut: f32,
) -> Result<(), Error> {
    let channels = weights.num_channels();
    if num_attractive > channels {
        return Err(Error::InvalidChannelSplit {
            attractive: num_attractive,
            channels,
        });
    }

    let split = num_attractive * weights.channel_len();
    let (attractive, repulsive) = weights.data_mut().split_at_mut(split);

    if invert_repulsive {
        for w in repulsive.iter_mut() {
            *w = 1.0 - *w;
        }
    }

    if bias_cut != 0.0 {
        for w in attractive.iter_mut() {
            *w += bias_cut;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use mws_core::{Error, Tensor};

    use super::transform_weights;

    fn assert_close(got: &[f32], want: &[f32]) {
        assert_eq!(got.len(), want.len());
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-6, "got={got:?} want={want:?}");
        }
    }

    fn weights() -> Tensor<f32> {
        Tensor::from_vec(&[3, 2], vec![0.9, 0.2, 0.25, 0.5, 0.0, 1.0]).expect("valid tensor")
    }

    #[test]
    fn inverts_repulsive_and_biases_attractive() {
        let mut w = weights();
        transform_weights(&mut w, 1, true, 0.5).expect("transform");
        assert_close(w.data(), &[1.4, 0.7, 0.75, 0.5, 1.0, 0.0]);
    }

    #[test]
    fn without_inversion_only_bias_applies() {
        let mut w = weights();
        transform_weights(&mut w, 2, false, -0.25).expect("transform");
        assert_close(w.data(), &[0.65, -0.05, 0.0, 0.25, 0.0, 1.0]);
    }

    #[test]
    fn applying_twice_is_not_identity() {
        let mut w = weights();
        transform_weights(&mut w, 1, true, 0.1).expect("first");
        transform_weights(&mut w, 1, true, 0.1).expect("second");

        // Inversion cancels out, the bias accumulates.
        assert_close(w.data(), &[1.1, 0.4, 0.25, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn rejects_split_beyond_channels() {
        let mut w = weights();
        assert_eq!(
            transform_weights(&mut w, 4, true, 0.0),
            Err(Error::InvalidChannelSplit {
                attractive: 4,
                channels: 3
            })
        );
    }
}
