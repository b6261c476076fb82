use mws_core::{Error, Layout, Tensor};

use crate::bounds::{contains, inside_ranges};

/// Affinities of a label grid under a set of offsets.
///
/// Returns `(affs, valid)`, both of shape `(C, d1, .., dn)`:
/// - `affs[c, v]` is `1.0` when `v + offsets[c]` lies inside the grid and has
///   the same label as `v`, `0.0` otherwise.
/// - `valid[c, v]` is `true` when `v + offsets[c]` lies inside the grid and
///   neither endpoint carries `ignore_label`.
///
/// Ignored pairs get affinity `0.0`.
pub fn compute_affinities<T: PartialEq>(
    labels: &Tensor<T>,
    offsets: &[Vec<isize>],
    ignore_label: Option<&T>,
) -> Result<(Tensor<f32>, Tensor<bool>), Error> {
    let ndim = labels.ndim();
    if let Some(bad) = offsets.iter().find(|o| o.len() != ndim) {
        return Err(Error::DimensionMismatch {
            expected: ndim,
            actual: bad.len(),
        });
    }

    let layout = labels.layout();
    let mut shape = Vec::with_capacity(ndim + 1);
    shape.push(offsets.len());
    shape.extend_from_slice(labels.shape());

    let mut affs = Tensor::new_fill(&shape, 0.0f32);
    let mut valid = Tensor::new_fill(&shape, false);
    let src = labels.data();
    let is_ignored = |l: &T| ignore_label.is_some_and(|ig| ig == l);

    for (c, offset) in offsets.iter().enumerate() {
        let ranges = inside_ranges(&layout, offset);
        let stride = layout.offset_stride(offset);
        let aff_c = affs.channel_mut(c).expect("channel index in range");
        let valid_c = valid.channel_mut(c).expect("channel index in range");

        for_each_inside(&layout, &ranges, |flat| {
            let target = flat.wrapping_add_signed(stride);
            let (a, b) = (&src[flat], &src[target]);
            if is_ignored(a) || is_ignored(b) {
                return;
            }
            valid_c[flat] = true;
            if a == b {
                aff_c[flat] = 1.0;
            }
        });
    }

    Ok((affs, valid))
}

fn for_each_inside<F: FnMut(usize)>(
    layout: &Layout,
    ranges: &[std::ops::Range<usize>],
    mut f: F,
) {
    layout.for_each_coord(|flat, coords| {
        if contains(ranges, coords) {
            f(flat);
        }
    });
}

#[cfg(test)]
mod tests {
    use mws_core::{Error, Tensor};

    use super::compute_affinities;

    #[test]
    fn affinity_is_one_inside_segments() {
        let labels = Tensor::from_vec(&[1, 5], vec![1u32, 1, 2, 2, 2]).expect("valid tensor");
        let offsets = vec![vec![0, 1], vec![0, -2]];

        let (affs, valid) = compute_affinities(&labels, &offsets, None).expect("affinities");

        assert_eq!(affs.shape(), &[2, 1, 5]);
        assert_eq!(affs.channel(0), Some(&[1.0, 0.0, 1.0, 1.0, 0.0][..]));
        assert_eq!(valid.channel(0), Some(&[true, true, true, true, false][..]));
        assert_eq!(affs.channel(1), Some(&[0.0, 0.0, 0.0, 0.0, 1.0][..]));
        assert_eq!(valid.channel(1), Some(&[false, false, true, true, true][..]));
    }

    #[test]
    fn ignore_label_invalidates_pairs() {
        let labels = Tensor::from_vec(&[4], vec![0u8, 3, 3, 0]).expect("valid tensor");
        let offsets = vec![vec![1]];

        let (affs, valid) = compute_affinities(&labels, &offsets, Some(&0)).expect("affinities");

        assert_eq!(valid.data(), &[false, true, false, false]);
        assert_eq!(affs.data(), &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn rejects_offsets_of_wrong_length() {
        let labels = Tensor::new_fill(&[3, 3], true);
        let err = compute_affinities(&labels, &[vec![1]], None).expect_err("1d offset on 2d grid");
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }
}
