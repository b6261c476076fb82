use mws_core::{Error, Layout, OffsetGraph};

/// Flat edge indexing of an offset graph over one grid.
///
/// Edge `e` belongs to channel `e / num_nodes` and starts at voxel
/// `e % num_nodes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLattice {
    num_nodes: usize,
    offset_strides: Vec<isize>,
    num_attractive_edges: usize,
}

impl EdgeLattice {
    pub fn new(graph: &OffsetGraph, grid_shape: &[usize]) -> Result<Self, Error> {
        graph.check_grid(grid_shape)?;
        let layout = Layout::new(grid_shape)?;
        let num_nodes = layout.len();

        Ok(Self {
            num_nodes,
            offset_strides: graph.offset_strides(&layout),
            num_attractive_edges: num_nodes * graph.num_attractive(),
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_channels(&self) -> usize {
        self.offset_strides.len()
    }

    pub fn num_edges(&self) -> usize {
        self.num_nodes * self.offset_strides.len()
    }

    pub fn num_attractive_edges(&self) -> usize {
        self.num_attractive_edges
    }

    pub fn offset_strides(&self) -> &[isize] {
        &self.offset_strides
    }

    pub fn is_mutex(&self, edge: usize) -> bool {
        edge >= self.num_attractive_edges
    }

    pub fn edge_id(&self, channel: usize, node: usize) -> usize {
        channel * self.num_nodes + node
    }

    /// Endpoints `(u, v)` of `edge`, or `None` when the target leaves the
    /// flat voxel range.
    pub fn endpoints(&self, edge: usize) -> Option<(usize, usize)> {
        if self.num_nodes == 0 || edge >= self.num_edges() {
            return None;
        }
        let u = edge % self.num_nodes;
        let v = u.checked_add_signed(self.offset_strides[edge / self.num_nodes])?;
        (v < self.num_nodes).then_some((u, v))
    }

    pub(crate) fn check_len(&self, what_len: usize) -> Result<(), Error> {
        if what_len != self.num_edges() {
            return Err(Error::SizeMismatch {
                expected: self.num_edges(),
                actual: what_len,
            });
        }
        Ok(())
    }
}
