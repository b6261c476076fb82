use mws_graph::StrideSpec;
use serde::{Deserialize, Serialize};

use crate::Algorithm;

/// Parameters of [`crate::compute_segmentation`].
///
/// Missing JSON fields fall back to [`SegmentationConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Per-axis subsampling of repulsive edges; `None` keeps all of them.
    pub strides: Option<Vec<usize>>,
    /// Keep repulsive edges with probability `1 / prod(strides)` instead of
    /// on a regular lattice.
    pub randomize_strides: bool,
    /// Map repulsive weights `w` to `1 - w`.
    pub invert_repulsive_weights: bool,
    /// Added to attractive weights.
    pub bias_cut: f32,
    pub algorithm: Algorithm,
    /// Seed of the generator used for random strides.
    pub seed: u64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            strides: None,
            randomize_strides: false,
            invert_repulsive_weights: true,
            bias_cut: 0.0,
            algorithm: Algorithm::Kruskal,
            seed: 0,
        }
    }
}

impl SegmentationConfig {
    pub fn stride_spec(&self) -> Option<StrideSpec> {
        self.strides.as_ref().map(|s| StrideSpec {
            strides: s.clone(),
            randomize: self.randomize_strides,
        })
    }
}

#[cfg(test)]
mod tests {
    use mws_graph::StrideSpec;

    use super::SegmentationConfig;
    use crate::Algorithm;

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: SegmentationConfig =
            serde_json::from_str(r#"{ "algorithm": "prim", "bias_cut": 0.25 }"#).expect("config");

        assert_eq!(cfg.algorithm, Algorithm::Prim);
        assert_eq!(cfg.bias_cut, 0.25);
        assert!(cfg.invert_repulsive_weights);
        assert_eq!(cfg.strides, None);
        assert_eq!(cfg.stride_spec(), None);
    }

    #[test]
    fn stride_spec_carries_randomize_flag() {
        let cfg = SegmentationConfig {
            strides: Some(vec![2, 3]),
            randomize_strides: true,
            ..SegmentationConfig::default()
        };
        assert_eq!(cfg.stride_spec(), Some(StrideSpec::random(vec![2, 3])));
    }

    #[test]
    fn unknown_algorithm_fails_to_load() {
        let res = serde_json::from_str::<SegmentationConfig>(r#"{ "algorithm": "greedy" }"#);
        assert!(res.is_err());
    }
}
