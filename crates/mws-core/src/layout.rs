use std::ops::Range;

use crate::Error;

/// Row-major layout of an n-dimensional grid.
///
/// The last axis is contiguous. `strides[j]` is the distance, in elements,
/// between neighbors along axis `j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Vec<usize>,
    strides: Vec<usize>,
    len: usize,
}

impl Layout {
    pub fn new(shape: &[usize]) -> Result<Self, Error> {
        let mut strides = vec![0usize; shape.len()];
        let mut len = 1usize;
        for (j, &d) in shape.iter().enumerate().rev() {
            strides[j] = len;
            len = len.checked_mul(d).ok_or(Error::OutOfBounds)?;
        }

        Ok(Self {
            shape: shape.to_vec(),
            strides,
            len,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn ravel(&self, coords: &[usize]) -> Option<usize> {
        if coords.len() != self.ndim() {
            return None;
        }

        let mut idx = 0usize;
        for ((&c, &d), &s) in coords.iter().zip(&self.shape).zip(&self.strides) {
            if c >= d {
                return None;
            }
            idx += c * s;
        }
        Some(idx)
    }

    /// Writes the coordinates of `flat` into `coords`.
    ///
    /// `coords` must have `ndim()` elements and `flat < len()`.
    pub fn unravel_into(&self, flat: usize, coords: &mut [usize]) {
        debug_assert_eq!(coords.len(), self.ndim());
        debug_assert!(flat < self.len);

        let mut rem = flat;
        for (c, &s) in coords.iter_mut().zip(&self.strides) {
            *c = rem / s;
            rem %= s;
        }
    }

    pub fn unravel(&self, flat: usize) -> Option<Vec<usize>> {
        if flat >= self.len {
            return None;
        }
        let mut coords = vec![0usize; self.ndim()];
        self.unravel_into(flat, &mut coords);
        Some(coords)
    }

    /// Flat index of `flat + offset`, or `None` when the shifted voxel leaves
    /// the grid along any axis.
    pub fn shift(&self, flat: usize, offset: &[isize]) -> Option<usize> {
        if offset.len() != self.ndim() {
            return None;
        }
        let coords = self.unravel(flat)?;

        let mut idx = 0usize;
        for j in 0..self.ndim() {
            let moved = coords[j].checked_add_signed(offset[j])?;
            if moved >= self.shape[j] {
                return None;
            }
            idx += moved * self.strides[j];
        }
        Some(idx)
    }

    /// Displacement of `offset` in flat index space.
    pub fn offset_stride(&self, offset: &[isize]) -> isize {
        offset
            .iter()
            .zip(&self.strides)
            .map(|(&o, &s)| o * s as isize)
            .sum()
    }

    /// Coordinates `x` along `axis` for which `x + o` stays inside the grid.
    pub fn valid_range(&self, axis: usize, o: isize) -> Range<usize> {
        let d = self.shape[axis];
        let magnitude = o.unsigned_abs();
        if magnitude >= d {
            return 0..0;
        }
        if o < 0 { magnitude..d } else { 0..d - magnitude }
    }

    /// Visits every voxel in flat order together with its coordinates.
    pub fn for_each_coord<F: FnMut(usize, &[usize])>(&self, mut f: F) {
        if self.len == 0 {
            return;
        }

        let n = self.ndim();
        let mut coords = vec![0usize; n];
        for flat in 0..self.len {
            f(flat, &coords);

            // Odometer increment, last axis fastest.
            for j in (0..n).rev() {
                coords[j] += 1;
                if coords[j] < self.shape[j] {
                    break;
                }
                coords[j] = 0;
            }
        }
    }
}
