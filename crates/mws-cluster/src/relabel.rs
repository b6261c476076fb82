use std::collections::HashMap;

/// Rewrites `labels` in place to consecutive ids in order of first
/// appearance and returns the number of distinct ids assigned.
///
/// With `keep_zero`, label `0` stays `0` and the other labels start at `1`.
pub fn relabel_consecutive(labels: &mut [u64], keep_zero: bool) -> usize {
    let mut mapping: HashMap<u64, u64> = HashMap::new();
    let mut next = u64::from(keep_zero);

    for label in labels.iter_mut() {
        if keep_zero && *label == 0 {
            continue;
        }
        *label = *mapping.entry(*label).or_insert_with(|| {
            let id = next;
            next += 1;
            id
        });
    }

    mapping.len()
}

#[cfg(test)]
mod tests {
    use super::relabel_consecutive;

    #[test]
    fn first_appearance_order() {
        let mut labels = vec![7, 7, 3, 9, 3, 7];
        assert_eq!(relabel_consecutive(&mut labels, false), 3);
        assert_eq!(labels, vec![0, 0, 1, 2, 1, 0]);
    }

    #[test]
    fn zero_is_kept_as_background() {
        let mut labels = vec![0, 5, 5, 0, 2];
        assert_eq!(relabel_consecutive(&mut labels, true), 2);
        assert_eq!(labels, vec![0, 1, 1, 0, 2]);
    }

    #[test]
    fn zero_is_relabelled_without_keep_zero() {
        let mut labels = vec![4, 0, 4];
        assert_eq!(relabel_consecutive(&mut labels, false), 2);
        assert_eq!(labels, vec![0, 1, 0]);
    }
}
