use crate::{Error, Layout};

/// Implicit grid graph: one offset per channel plus the attractive/repulsive
/// split point.
///
/// Channels `[0, num_attractive)` are attractive, the remaining channels are
/// repulsive (mutex) channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetGraph {
    offsets: Vec<Vec<isize>>,
    num_attractive: usize,
}

impl OffsetGraph {
    /// Validates that the offsets are non-empty, share one dimensionality and
    /// that `num_attractive <= offsets.len()`.
    pub fn new(offsets: Vec<Vec<isize>>, num_attractive: usize) -> Result<Self, Error> {
        let Some(first) = offsets.first() else {
            return Err(Error::EmptyOffsets);
        };

        let ndim = first.len();
        if let Some(bad) = offsets.iter().find(|o| o.len() != ndim) {
            return Err(Error::DimensionMismatch {
                expected: ndim,
                actual: bad.len(),
            });
        }

        if num_attractive > offsets.len() {
            return Err(Error::InvalidChannelSplit {
                attractive: num_attractive,
                channels: offsets.len(),
            });
        }

        Ok(Self {
            offsets,
            num_attractive,
        })
    }

    pub fn offsets(&self) -> &[Vec<isize>] {
        &self.offsets
    }

    pub fn offset(&self, channel: usize) -> Option<&[isize]> {
        self.offsets.get(channel).map(Vec::as_slice)
    }

    pub fn num_channels(&self) -> usize {
        self.offsets.len()
    }

    pub fn num_attractive(&self) -> usize {
        self.num_attractive
    }

    pub fn num_repulsive(&self) -> usize {
        self.offsets.len() - self.num_attractive
    }

    pub fn ndim(&self) -> usize {
        self.offsets[0].len()
    }

    pub fn is_attractive(&self, channel: usize) -> bool {
        channel < self.num_attractive
    }

    /// Checks that the grid has the same dimensionality as the offsets.
    pub fn check_grid(&self, grid_shape: &[usize]) -> Result<(), Error> {
        if grid_shape.len() != self.ndim() {
            return Err(Error::DimensionMismatch {
                expected: self.ndim(),
                actual: grid_shape.len(),
            });
        }
        Ok(())
    }

    /// Checks a `(C, d1, .., dn)` edge tensor shape against this graph and
    /// returns the grid part `(d1, .., dn)`.
    pub fn grid_shape<'a>(&self, edge_shape: &'a [usize]) -> Result<&'a [usize], Error> {
        let Some((&channels, grid)) = edge_shape.split_first() else {
            return Err(Error::DimensionMismatch {
                expected: self.ndim() + 1,
                actual: 0,
            });
        };

        if channels != self.num_channels() {
            return Err(Error::DimensionMismatch {
                expected: self.num_channels(),
                actual: channels,
            });
        }
        self.check_grid(grid)?;
        Ok(grid)
    }

    /// Shape `(C, d1, .., dn)` of an edge tensor over `grid_shape`.
    pub fn edge_shape(&self, grid_shape: &[usize]) -> Vec<usize> {
        let mut shape = Vec::with_capacity(grid_shape.len() + 1);
        shape.push(self.num_channels());
        shape.extend_from_slice(grid_shape);
        shape
    }

    /// Per-channel displacement in flat index space.
    pub fn offset_strides(&self, layout: &Layout) -> Vec<isize> {
        self.offsets
            .iter()
            .map(|o| layout.offset_stride(o))
            .collect()
    }
}
