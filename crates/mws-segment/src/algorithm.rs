use core::fmt;
use core::str::FromStr;

use mws_core::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Clustering variant run by the segmentation driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// Edges processed in global priority order.
    #[default]
    Kruskal,
    /// Clusters grown from seed voxels with a priority queue.
    Prim,
    /// Unconstrained merges form a spanning forest; constrained merges are cut.
    Divisive,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Kruskal, Algorithm::Prim, Algorithm::Divisive];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kruskal => "kruskal",
            Self::Prim => "prim",
            Self::Divisive => "divisive",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnsupportedAlgorithm(s.to_string()))
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
