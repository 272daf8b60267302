#![forbid(unsafe_code)]

pub mod config;
pub mod error;

pub mod util {
    pub mod word;
    pub mod words;
}

pub mod container {
    pub mod data;
    pub mod directory;
    pub mod groups;
    pub mod header;
    pub mod parameter;
}

pub mod read {
    pub mod import;
}

pub mod export {
    pub mod csv;
    pub mod text;
}

pub mod cloud;

pub mod cluster {
    pub mod kmeans;
}

pub mod bones;
pub mod domain;
pub mod model;
pub mod query;
pub mod session;

// Re-exports: stable API surface
pub use bones::BoneGraph;
pub use cloud::{Cloud, Vec3};
pub use cluster::kmeans::{Cluster, Color, kmeans};
pub use config::ViewerConfig;
pub use query::MotionQuery;
pub use read::import::C3dFile;
pub use session::Session;
