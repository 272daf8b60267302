use crate::bones::BoneGraph;
use crate::cloud::{Cloud, Vec3};
use crate::cluster::kmeans::{Cluster, Color, kmeans};
use crate::config::{MAX_VELOCITY, MIN_VELOCITY, ViewerConfig};
use crate::domain::{BoneRow, ClusterRow, RenderPoint};
use crate::error::{MocapError, Result};
use crate::model::{Model, ModelColor};
use crate::query::MotionQuery;
use crate::read::import::C3dFile;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    pub play: bool,
    pub velocity: i32,
    pub frame: usize,
}

/// Clamp to a signed step of magnitude 1..=10; zero becomes 1.
pub fn clamp_velocity(v: i32) -> i32 {
    if v == 0 {
        return MIN_VELOCITY;
    }
    v.signum() * v.abs().clamp(MIN_VELOCITY, MAX_VELOCITY)
}

impl Playback {
    /// Advance one render tick over `frames` frames, wrapping at both ends.
    pub fn tick(&mut self, frames: usize) -> usize {
        if !self.play || frames == 0 {
            return self.frame;
        }
        let last = frames as i64 - 1;
        let next = self.frame as i64 + self.velocity as i64;
        self.frame = if next > last {
            0
        } else if next < 0 {
            last as usize
        } else {
            next as usize
        };
        self.frame
    }
}

/// Everything derived from one loaded file.
#[derive(Debug, Clone)]
struct Loaded {
    file: C3dFile,
    cloud: Cloud,
    clusters: Vec<Cluster>,
}

/// Viewer state: the loaded file, its cloud, clusters, bone model and playback.
#[derive(Debug, Clone)]
pub struct Session {
    config: ViewerConfig,
    loaded: Option<Loaded>,
    model: Model,
    playback: Playback,
    min_threshold: f32,
    max_threshold: f32,
}

impl Session {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            playback: Playback {
                play: false,
                velocity: clamp_velocity(config.velocity),
                frame: 0,
            },
            min_threshold: config.min_threshold,
            max_threshold: config.max_threshold,
            loaded: None,
            model: Model::default(),
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Import `path` and rebuild cloud and clusters. On error the previous
    /// state is left untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = C3dFile::import(path)?;
        self.install(file)
    }

    /// Replace the session contents with an already decoded file.
    pub fn install(&mut self, file: C3dFile) -> Result<()> {
        let cloud = Cloud::from_c3d(&file);
        let markers = cloud.marker_count();
        let k = self.config.cluster_count.min(markers);
        let clusters = if k == 0 {
            Vec::new()
        } else {
            let first = cloud.frames[0].points.clone();
            kmeans(&first, k, &self.config.kmeans)?.clusters
        };
        info!(
            frames = cloud.frame_count(),
            markers,
            clusters = clusters.len(),
            "session loaded"
        );
        self.loaded = Some(Loaded {
            file,
            cloud,
            clusters,
        });
        self.model = Model::default();
        self.playback.frame = 0;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn file(&self) -> Option<&C3dFile> {
        self.loaded.as_ref().map(|l| &l.file)
    }

    pub fn cloud(&self) -> Option<&Cloud> {
        self.loaded.as_ref().map(|l| &l.cloud)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded
            .as_ref()
            .ok_or_else(|| MocapError::NotFound("no file loaded".into()))
    }

    fn cluster_mut(&mut self, index: usize) -> Result<&mut Cluster> {
        self.loaded
            .as_mut()
            .and_then(|l| l.clusters.get_mut(index))
            .ok_or_else(|| MocapError::NotFound(format!("cluster {index}")))
    }

    /// Re-run k-means on frame 0 with `k` clusters. An invalid `k` keeps
    /// the current clusters.
    pub fn recluster(&mut self, k: usize) -> Result<()> {
        let loaded = self
            .loaded
            .as_mut()
            .ok_or_else(|| MocapError::NotFound("no file loaded".into()))?;
        let first = loaded
            .cloud
            .frame(0)
            .map(|f| f.points.clone())
            .unwrap_or_default();
        let clustering = kmeans(&first, k, &self.config.kmeans)?;
        loaded.clusters = clustering.clusters;
        self.config.cluster_count = k;
        Ok(())
    }

    pub fn cluster_index(&self, name: &str) -> Result<usize> {
        self.loaded()?
            .clusters
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| MocapError::NotFound(format!("cluster {name}")))
    }

    pub fn set_cluster_color(&mut self, index: usize, color: Color) -> Result<()> {
        self.cluster_mut(index)?.color = color;
        Ok(())
    }

    pub fn set_cluster_name(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.cluster_mut(index)?.name = name.into();
        Ok(())
    }

    pub fn set_cluster_point_size(&mut self, index: usize, size: f32) -> Result<()> {
        self.cluster_mut(index)?.point_size = size;
        Ok(())
    }

    pub fn set_cluster_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        self.cluster_mut(index)?.visible = visible;
        Ok(())
    }

    pub fn set_cluster_visible_by_name(&mut self, name: &str, visible: bool) -> Result<()> {
        let i = self.cluster_index(name)?;
        self.set_cluster_visible(i, visible)
    }

    /// Infer bones for the named cluster and make them the session model.
    pub fn infer_bones(&mut self, cluster_name: &str) -> Result<&BoneGraph> {
        let i = self.cluster_index(cluster_name)?;
        let loaded = self.loaded()?;
        let model = Model::from_cluster(&loaded.clusters[i], &loaded.cloud, &self.config.bones);
        let name = std::mem::take(&mut self.model.name);
        let color = self.model.color;
        self.model = Model {
            name,
            color,
            ..model
        };
        Ok(&self.model.bones)
    }

    pub fn set_bone_visible(&mut self, visible: bool) {
        self.model.bone_view = visible;
    }

    pub fn set_model_name(&mut self, name: impl Into<String>) {
        self.model.name = name.into();
    }

    pub fn set_model_color(&mut self, color: ModelColor) {
        self.model.color = color;
    }

    pub fn play(&mut self, play: bool) {
        self.playback.play = play;
    }

    pub fn set_velocity(&mut self, velocity: i32) {
        self.playback.velocity = clamp_velocity(velocity);
    }

    pub fn set_frame(&mut self, frame: usize) -> Result<()> {
        let frames = MotionQuery::frame_count(self);
        if frame >= frames {
            return Err(MocapError::NotFound(format!(
                "frame {frame} of {frames}"
            )));
        }
        self.playback.frame = frame;
        Ok(())
    }

    /// One render tick; returns the frame to draw.
    pub fn tick(&mut self) -> usize {
        let frames = MotionQuery::frame_count(self);
        let f = self.playback.tick(frames);
        debug!(frame = f, "tick");
        f
    }

    pub fn set_thresholds(&mut self, min: f32, max: f32) {
        self.min_threshold = min.min(max);
        self.max_threshold = max.max(min);
    }

    pub fn thresholds(&self) -> (f32, f32) {
        (self.min_threshold, self.max_threshold)
    }

    pub fn centroid(&self, frame: usize) -> Option<Vec3> {
        self.cloud()?.frame(frame).map(|f| f.centroid)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

fn cluster_row(index: usize, c: &Cluster) -> ClusterRow {
    ClusterRow {
        index,
        name: c.name.clone(),
        color: c.color,
        point_size: c.point_size,
        visible: c.visible,
        member_ids: c.member_ids(),
        centroid: c.centroid,
    }
}

impl MotionQuery for Session {
    fn cluster_count(&self) -> usize {
        self.loaded.as_ref().map_or(0, |l| l.clusters.len())
    }

    fn cluster(&self, index: usize) -> Result<ClusterRow> {
        self.loaded()?
            .clusters
            .get(index)
            .map(|c| cluster_row(index, c))
            .ok_or_else(|| MocapError::NotFound(format!("cluster {index}")))
    }

    fn bone_graph(&self) -> Vec<BoneRow> {
        self.model
            .bones
            .bones
            .iter()
            .map(|b| BoneRow {
                id_base: b.id_base,
                new_connections: b.new_connections.clone(),
                prev_connections: b.prev_connections.clone(),
            })
            .collect()
    }

    fn bone_segments(&self, frame: usize) -> Vec<(Vec3, Vec3)> {
        if !self.model.bone_view {
            return Vec::new();
        }
        self.model.bones.segments(frame)
    }

    fn frame_count(&self) -> usize {
        self.cloud().map_or(0, Cloud::frame_count)
    }

    fn current_frame(&self) -> usize {
        self.playback.frame
    }

    fn is_playing(&self) -> bool {
        self.playback.play
    }

    fn velocity(&self) -> i32 {
        self.playback.velocity
    }

    fn visible_points(&self, frame: usize) -> Vec<RenderPoint> {
        let Some(loaded) = self.loaded.as_ref() else {
            return Vec::new();
        };
        let Some(cf) = loaded.cloud.frame(frame) else {
            return Vec::new();
        };
        cf.points
            .iter()
            .filter(|p| {
                let dr = loaded.cloud.relocation(p.id);
                dr >= self.min_threshold && dr <= self.max_threshold
            })
            .filter_map(|p| {
                let c = loaded
                    .clusters
                    .iter()
                    .find(|c| c.visible && c.contains(p.id))?;
                Some(RenderPoint {
                    id: p.id,
                    name: loaded.cloud.name(p.id).to_string(),
                    pos: p.pos,
                    color: c.color,
                    point_size: c.point_size,
                })
            })
            .collect()
    }
}
