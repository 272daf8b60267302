use crate::bones::BoneGraph;
use crate::cloud::Cloud;
use crate::cluster::kmeans::Cluster;
use crate::config::BoneConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// Named skeleton built from one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    pub color: ModelColor,
    /// Set once a bone graph has been inferred.
    pub active: bool,
    pub bones: BoneGraph,
    pub bone_view: bool,
    /// Cluster the bones were inferred from.
    pub source_cluster: Option<String>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            name: "Model".to_string(),
            color: ModelColor::default(),
            active: false,
            bones: BoneGraph::default(),
            bone_view: false,
            source_cluster: None,
        }
    }
}

impl Model {
    pub fn from_cluster(cluster: &Cluster, cloud: &Cloud, cfg: &BoneConfig) -> Self {
        Self {
            active: true,
            bones: BoneGraph::infer(cluster, cloud, cfg),
            bone_view: true,
            source_cluster: Some(cluster.name.clone()),
            ..Default::default()
        }
    }

    /// Colour as renderer floats.
    pub fn rgb(&self) -> [f32; 3] {
        [
            self.color.red as f32 / 255.0,
            self.color.green as f32 / 255.0,
            self.color.blue as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_black_and_inactive() {
        let m = Model::default();
        assert_eq!(m.name, "Model");
        assert_eq!(m.rgb(), [0.0, 0.0, 0.0]);
        assert!(!m.active);
        assert!(m.bones.is_empty());
    }

    #[test]
    fn rgb_scales_to_unit_range() {
        let m = Model {
            color: ModelColor {
                red: 255,
                green: 0,
                blue: 51,
            },
            ..Default::default()
        };
        assert_eq!(m.rgb(), [1.0, 0.0, 0.2]);
    }
}
