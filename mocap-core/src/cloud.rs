use crate::read::import::C3dFile;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn distance_sq(self, other: Self) -> f32 {
        (self - other).length_sq()
    }

    pub fn manhattan(self, other: Self) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }

    /// Largest per-axis difference.
    pub fn max_axis_delta(self, other: Self) -> f32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// Arithmetic mean, `None` for an empty set.
    pub fn mean(points: impl IntoIterator<Item = Vec3>) -> Option<Vec3> {
        let (sum, n) = points
            .into_iter()
            .fold((Vec3::ZERO, 0usize), |(s, n), p| (s + p, n + 1));
        (n > 0).then(|| sum / n as f32)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// Marker position in metres. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    pub id: usize,
    pub pos: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudFrame {
    pub points: Vec<CloudPoint>,
    pub centroid: Vec3,
}

impl CloudFrame {
    pub fn new(positions: Vec<Vec3>) -> Self {
        let centroid = Vec3::mean(positions.iter().copied()).unwrap_or(Vec3::ZERO);
        let points = positions
            .into_iter()
            .enumerate()
            .map(|(i, pos)| CloudPoint { id: i + 1, pos })
            .collect();
        Self { points, centroid }
    }

    pub fn position(&self, id: usize) -> Option<Vec3> {
        id.checked_sub(1)
            .and_then(|i| self.points.get(i))
            .map(|p| p.pos)
    }
}

/// Per-frame marker positions normalised to the viewer's Y-up metre frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cloud {
    pub frames: Vec<CloudFrame>,
    /// Marker labels indexed by `id - 1`.
    pub labels: Vec<String>,
    /// First-to-last frame displacement per marker, in metres.
    pub relocation: Vec<f32>,
    pub multiplier: f32,
}

impl Cloud {
    pub fn from_c3d(file: &C3dFile) -> Self {
        let multiplier = file.point.multiplier_for_meters();
        let markers = file.point_count();
        let frames: Vec<CloudFrame> = file
            .data
            .frames
            .par_iter()
            .map(|f| {
                let positions = f
                    .points
                    .iter()
                    .map(|p| {
                        let [x, y, z] = file.point.check_screens(p.x, p.y, p.z);
                        Vec3::new(x, y, z) * multiplier
                    })
                    .collect();
                CloudFrame::new(positions)
            })
            .collect();
        let labels = (0..markers).map(|i| file.label(i)).collect();
        let relocation = (0..markers)
            .map(|i| file.relocation().magnitude(i) * multiplier)
            .collect();
        debug!(frames = frames.len(), markers, multiplier, "built cloud");
        Self {
            frames,
            labels,
            relocation,
            multiplier,
        }
    }

    /// Cloud from positions already in metres.
    pub fn from_positions(frames: Vec<Vec<Vec3>>, labels: Vec<String>) -> Self {
        let relocation = match (frames.first(), frames.last()) {
            (Some(a), Some(b)) => a
                .iter()
                .zip(b)
                .map(|(p, q)| p.distance_sq(*q).sqrt())
                .collect(),
            _ => Vec::new(),
        };
        Self {
            frames: frames.into_par_iter().map(CloudFrame::new).collect(),
            labels,
            relocation,
            multiplier: 1.0,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn marker_count(&self) -> usize {
        self.frames.first().map_or(0, |f| f.points.len())
    }

    pub fn frame(&self, i: usize) -> Option<&CloudFrame> {
        self.frames.get(i)
    }

    pub fn position(&self, frame: usize, id: usize) -> Option<Vec3> {
        self.frame(frame).and_then(|f| f.position(id))
    }

    pub fn name(&self, id: usize) -> &str {
        id.checked_sub(1)
            .and_then(|i| self.labels.get(i))
            .map_or("", String::as_str)
    }

    pub fn relocation(&self, id: usize) -> f32 {
        id.checked_sub(1)
            .and_then(|i| self.relocation.get(i))
            .copied()
            .unwrap_or_default()
    }
}
