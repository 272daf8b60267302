use crate::cloud::{Cloud, CloudPoint, Vec3};
use crate::cluster::kmeans::Cluster;
use crate::config::BoneConfig;
use rayon::prelude::*;
use tracing::{debug, info};

/// Rigid links of one marker inside the bone graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connections {
    pub id_base: usize,
    /// Markers after this one in cluster order.
    pub new_connections: Vec<usize>,
    /// Markers before this one in cluster order.
    pub prev_connections: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneGraph {
    /// One entry per cluster member, in cluster order.
    pub bones: Vec<Connections>,
    /// Per frame, the members' positions indexed like `bones`.
    pub points: Vec<Vec<CloudPoint>>,
}

/// Matches needed for a pair to count as rigid.
pub fn accuracy_threshold(frames: usize, percent: u32) -> usize {
    (percent as usize * (frames / 4)) / 100
}

fn rigid(track_a: &[Vec3], track_b: &[Vec3], cfg: &BoneConfig) -> bool {
    let (Some(a0), Some(b0)) = (track_a.first(), track_b.first()) else {
        return false;
    };
    let d0 = a0.distance_sq(*b0);
    let tally = track_a
        .iter()
        .zip(track_b)
        .skip(1)
        .step_by(cfg.frame_stride.max(1))
        .filter(|(a, b)| (a.distance_sq(**b) - d0).abs() < cfg.distance_tolerance)
        .count();
    tally > accuracy_threshold(track_a.len(), cfg.accuracy_percent)
}

impl BoneGraph {
    /// Infer rigid marker pairs of `cluster` from their trajectories in `cloud`.
    ///
    /// A pair is rigid when its squared distance stays within tolerance of
    /// the frame-0 value on enough sampled frames. Fewer than two frames give
    /// an empty graph.
    pub fn infer(cluster: &Cluster, cloud: &Cloud, cfg: &BoneConfig) -> Self {
        let ids = cluster.member_ids();
        let points: Vec<Vec<CloudPoint>> = cloud
            .frames
            .iter()
            .map(|f| {
                ids.iter()
                    .filter_map(|&id| f.position(id).map(|pos| CloudPoint { id, pos }))
                    .collect()
            })
            .collect();
        let tracks: Vec<Vec<Vec3>> = ids
            .iter()
            .map(|&id| cloud.frames.iter().filter_map(|f| f.position(id)).collect())
            .collect();

        let n = ids.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                let tracks = &tracks;
                (i + 1..n)
                    .filter(move |&j| rigid(&tracks[i], &tracks[j], cfg))
                    .map(move |j| (i, j))
            })
            .collect();

        let mut bones: Vec<Connections> = ids
            .iter()
            .map(|&id| Connections {
                id_base: id,
                ..Default::default()
            })
            .collect();
        for &(i, j) in &pairs {
            debug!(a = ids[i], b = ids[j], "rigid pair");
            bones[i].new_connections.push(ids[j]);
            bones[j].prev_connections.push(ids[i]);
        }
        info!(
            cluster = %cluster.name,
            markers = n,
            frames = cloud.frame_count(),
            pairs = pairs.len(),
            "bone inference finished"
        );
        Self { bones, points }
    }

    pub fn is_empty(&self) -> bool {
        self.connection_count() == 0
    }

    pub fn connection_count(&self) -> usize {
        self.bones.iter().map(|b| b.new_connections.len()).sum()
    }

    /// Every rigid pair as `(base id, connected id)`.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.bones
            .iter()
            .flat_map(|b| b.new_connections.iter().map(move |&j| (b.id_base, j)))
            .collect()
    }

    /// Line segments to draw for `frame`.
    pub fn segments(&self, frame: usize) -> Vec<(Vec3, Vec3)> {
        let Some(points) = self.points.get(frame) else {
            return Vec::new();
        };
        let pos = |id: usize| points.iter().find(|p| p.id == id).map(|p| p.pos);
        self.pairs()
            .into_iter()
            .filter_map(|(a, b)| Some((pos(a)?, pos(b)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::kmeans::Color;

    fn cluster_of(cloud: &Cloud) -> Cluster {
        Cluster {
            members: cloud.frames[0].points.clone(),
            centroid: Vec3::ZERO,
            color: Color::default(),
            name: "Cluster_0 (2)".into(),
            point_size: 1.0,
            visible: true,
        }
    }

    #[test]
    fn test_accuracy_threshold() {
        assert_eq!(accuracy_threshold(40, 85), 8);
        assert_eq!(accuracy_threshold(3, 85), 0);
        assert_eq!(accuracy_threshold(1, 85), 0);
    }

    #[test]
    fn test_translating_pair_is_rigid() {
        let frames: Vec<Vec<Vec3>> = (0..20)
            .map(|f| {
                let t = f as f32 * 0.1;
                vec![Vec3::new(t, 0.0, 0.0), Vec3::new(t + 0.5, 0.0, 0.0)]
            })
            .collect();
        let cloud = Cloud::from_positions(frames, vec![]);
        let g = BoneGraph::infer(&cluster_of(&cloud), &cloud, &BoneConfig::default());
        assert_eq!(g.pairs(), vec![(1, 2)]);
        assert_eq!(g.bones[1].prev_connections, vec![1]);
        let seg = g.segments(19);
        assert_eq!(seg.len(), 1);
        assert!((seg[0].1.x - seg[0].0.x - 0.5).abs() < 1e-5);
        assert!(g.segments(20).is_empty());
    }

    #[test]
    fn test_single_frame_has_no_bones() {
        let cloud = Cloud::from_positions(
            vec![vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)]],
            vec![],
        );
        let g = BoneGraph::infer(&cluster_of(&cloud), &cloud, &BoneConfig::default());
        assert!(g.is_empty());
        assert_eq!(g.bones.len(), 2);
        assert_eq!(g.points.len(), 1);
    }

    #[test]
    fn test_stretching_pair_is_not_rigid() {
        let frames: Vec<Vec<Vec3>> = (0..20)
            .map(|f| vec![Vec3::ZERO, Vec3::new(1.0 + f as f32 * 0.1, 0.0, 0.0)])
            .collect();
        let cloud = Cloud::from_positions(frames, vec![]);
        let g = BoneGraph::infer(&cluster_of(&cloud), &cloud, &BoneConfig::default());
        assert!(g.is_empty());
    }
}
