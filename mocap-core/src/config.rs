use crate::error::{MocapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MIN_VELOCITY: i32 = 1;
pub const MAX_VELOCITY: i32 = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    /// Per-axis centroid movement below which iteration stops.
    pub tolerance: f32,
    pub max_iterations: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            max_iterations: 1000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoneConfig {
    /// Allowed drift of a squared pair distance from its first-frame value.
    pub distance_tolerance: f32,
    /// Share of `frames / 4` a pair must match to count as rigid.
    pub accuracy_percent: u32,
    pub frame_stride: usize,
}

impl Default for BoneConfig {
    fn default() -> Self {
        Self {
            distance_tolerance: 0.003,
            accuracy_percent: 85,
            frame_stride: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub cluster_count: usize,
    pub tick_ms: u64,
    pub velocity: i32,
    pub min_threshold: f32,
    pub max_threshold: f32,
    pub kmeans: KMeansConfig,
    pub bones: BoneConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            cluster_count: 1,
            tick_ms: 30,
            velocity: 1,
            min_threshold: 0.0,
            max_threshold: 10.0,
            kmeans: KMeansConfig::default(),
            bones: BoneConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| MocapError::Format(format!("config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(MocapError::Format(format!("config: {msg}")));
        if self.cluster_count == 0 {
            return bad("cluster_count must be at least 1".into());
        }
        if self.tick_ms == 0 {
            return bad("tick_ms must be positive".into());
        }
        if !(MIN_VELOCITY..=MAX_VELOCITY).contains(&self.velocity.abs()) {
            return bad(format!(
                "velocity {} outside {MIN_VELOCITY}..={MAX_VELOCITY}",
                self.velocity
            ));
        }
        if self.min_threshold > self.max_threshold {
            return bad(format!(
                "min_threshold {} above max_threshold {}",
                self.min_threshold, self.max_threshold
            ));
        }
        if self.kmeans.tolerance <= 0.0 || self.kmeans.max_iterations == 0 {
            return bad("kmeans tolerance and max_iterations must be positive".into());
        }
        if self.bones.distance_tolerance <= 0.0 || self.bones.frame_stride == 0 {
            return bad("bone distance_tolerance and frame_stride must be positive".into());
        }
        if self.bones.accuracy_percent > 100 {
            return bad(format!(
                "accuracy_percent {} above 100",
                self.bones.accuracy_percent
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ViewerConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.tick_ms, 30);
        assert_eq!(cfg.kmeans.max_iterations, 1000);
        assert_eq!(cfg.bones.accuracy_percent, 85);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: ViewerConfig =
            serde_json::from_str(r#"{"cluster_count": 4, "bones": {"frame_stride": 3}}"#).unwrap();
        assert_eq!(cfg.cluster_count, 4);
        assert_eq!(cfg.bones.frame_stride, 3);
        assert_eq!(cfg.bones.distance_tolerance, 0.003);
        assert_eq!(cfg.velocity, 1);
    }

    #[test]
    fn rejects_out_of_range() {
        let cfg = ViewerConfig {
            velocity: 11,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(MocapError::Format(_))));
        let cfg = ViewerConfig {
            min_threshold: 2.0,
            max_threshold: 1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = ViewerConfig {
            velocity: -10,
            ..Default::default()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        std::fs::write(&path, r#"{"tick_ms": 15}"#).unwrap();
        assert_eq!(ViewerConfig::load(&path).unwrap().tick_ms, 15);
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(ViewerConfig::load(&path), Err(MocapError::Format(_))));
    }
}
