use std::ops::Range;

use mws_core::Layout;

/// Per-axis coordinate ranges whose voxels stay inside the grid when shifted
/// by `offset`.
pub(crate) fn inside_ranges(layout: &Layout, offset: &[isize]) -> Vec<Range<usize>> {
    offset
        .iter()
        .enumerate()
        .map(|(axis, &o)| layout.valid_range(axis, o))
        .collect()
}

#[inline]
pub(crate) fn contains(ranges: &[Range<usize>], coords: &[usize]) -> bool {
    ranges.iter().zip(coords).all(|(r, c)| r.contains(c))
}
