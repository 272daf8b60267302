// mocap_core/src/query.rs
use crate::cloud::Vec3;
use crate::domain::{BoneRow, ClusterRow, RenderPoint};
use crate::error::Result;

/// Read side of a viewer session, as consumed by a renderer or UI.
pub trait MotionQuery {
    fn cluster_count(&self) -> usize;

    fn cluster(&self, index: usize) -> Result<ClusterRow>;

    fn clusters(&self) -> Vec<ClusterRow> {
        (0..self.cluster_count())
            .filter_map(|i| self.cluster(i).ok())
            .collect()
    }

    fn bone_graph(&self) -> Vec<BoneRow>;

    /// Bone line segments for `frame`; empty while bones are hidden.
    fn bone_segments(&self, frame: usize) -> Vec<(Vec3, Vec3)>;

    fn frame_count(&self) -> usize;

    fn current_frame(&self) -> usize;

    fn is_playing(&self) -> bool;

    fn velocity(&self) -> i32;

    /// Points of `frame` inside the relocation thresholds whose cluster is visible.
    fn visible_points(&self, frame: usize) -> Vec<RenderPoint>;
}
