use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch {
        expected: usize,
        actual: usize,
    },
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    DimensionMismatch {
        expected: usize,
        actual: usize,
    },
    InvalidChannelSplit {
        attractive: usize,
        channels: usize,
    },
    UnsupportedAlgorithm(String),
    EmptyOffsets,
    InvalidStride,
    OutOfBounds,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected:?}, got {actual:?}")
            }
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {expected} dimensions, got {actual}"
                )
            }
            Self::InvalidChannelSplit {
                attractive,
                channels,
            } => write!(
                f,
                "invalid channel split: {attractive} attractive channels out of {channels}"
            ),
            Self::UnsupportedAlgorithm(name) => write!(f, "unsupported algorithm: {name}"),
            Self::EmptyOffsets => write!(f, "offset list is empty"),
            Self::InvalidStride => write!(f, "invalid stride"),
            Self::OutOfBounds => write!(f, "out of bounds"),
        }
    }
}

impl std::error::Error for Error {}
