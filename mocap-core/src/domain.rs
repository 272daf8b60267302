// mocap_core/src/domain.rs
use crate::cloud::Vec3;
use crate::cluster::kmeans::Color;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterRow {
    pub index: usize,
    pub name: String,
    pub color: Color,
    pub point_size: f32,
    pub visible: bool,
    pub member_ids: Vec<usize>,
    pub centroid: Vec3,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoneRow {
    pub id_base: usize,
    pub new_connections: Vec<usize>,
    pub prev_connections: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderPoint {
    pub id: usize,
    pub name: String,
    pub pos: Vec3,
    pub color: Color,
    pub point_size: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub frames: usize,
    pub points: usize,
    pub analog: usize,
    pub frame_rate: f32,
    pub units: String,
    pub float_storage: bool,
    pub big_endian: bool,
    pub software: String,
}
