use crate::{Error, Layout};

/// Dense, owned, row-major n-dimensional array.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T> Tensor<T> {
    pub fn from_vec(shape: &[usize], data: Vec<T>) -> Result<Self, Error> {
        let expected = checked_len(shape).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            shape: shape.to_vec(),
            data,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn layout(&self) -> Layout {
        Layout::new(&self.shape).expect("tensor shape validated at construction")
    }

    pub fn get(&self, coords: &[usize]) -> Option<&T> {
        let idx = self.layout().ravel(coords)?;
        self.data.get(idx)
    }

    pub fn get_mut(&mut self, coords: &[usize]) -> Option<&mut T> {
        let idx = self.layout().ravel(coords)?;
        self.data.get_mut(idx)
    }

    /// Number of elements in one slice of the leading axis.
    pub fn channel_len(&self) -> usize {
        match self.shape.split_first() {
            Some((_, rest)) => rest.iter().product(),
            None => 0,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Contiguous slice `c` of the leading axis.
    pub fn channel(&self, c: usize) -> Option<&[T]> {
        if c >= self.num_channels() {
            return None;
        }
        let n = self.channel_len();
        self.data.get(c * n..(c + 1) * n)
    }

    pub fn channel_mut(&mut self, c: usize) -> Option<&mut [T]> {
        if c >= self.num_channels() {
            return None;
        }
        let n = self.channel_len();
        self.data.get_mut(c * n..(c + 1) * n)
    }

    pub fn reshape(self, shape: &[usize]) -> Result<Self, Error> {
        Self::from_vec(shape, self.data)
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Tensor<U> {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Clone> Tensor<T> {
    pub fn new_fill(shape: &[usize], value: T) -> Self {
        let len = checked_len(shape).expect("tensor size overflow");
        Self {
            shape: shape.to_vec(),
            data: vec![value; len],
        }
    }
}

fn checked_len(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}
