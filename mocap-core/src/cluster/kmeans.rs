use crate::cloud::{CloudPoint, Vec3};
use crate::config::KMeansConfig;
use crate::error::{MocapError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const DEFAULT_POINT_SIZE: f32 = 1.0;

/// RGB in 0.0..=1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Random colour from OS entropy, or a fixed palette entry when the
    /// entropy source is unavailable.
    pub fn random(fallback_index: usize) -> Self {
        let mut b = [0u8; 3];
        match getrandom::getrandom(&mut b) {
            Ok(()) => Self::new(
                (b[0] % 255) as f32 / 255.0,
                (b[1] % 255) as f32 / 255.0,
                (b[2] % 255) as f32 / 255.0,
            ),
            Err(e) => {
                warn!(error = %e, "no entropy for cluster colour, using palette");
                PALETTE[fallback_index % PALETTE.len()]
            }
        }
    }
}

const PALETTE: [Color; 6] = [
    Color::new(0.9, 0.2, 0.2),
    Color::new(0.2, 0.7, 0.3),
    Color::new(0.2, 0.4, 0.9),
    Color::new(0.9, 0.7, 0.1),
    Color::new(0.6, 0.3, 0.8),
    Color::new(0.1, 0.8, 0.8),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Frame-0 markers assigned to this cluster, in cloud order.
    pub members: Vec<CloudPoint>,
    pub centroid: Vec3,
    pub color: Color,
    pub name: String,
    pub point_size: f32,
    pub visible: bool,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn member_ids(&self) -> Vec<usize> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.members.iter().any(|m| m.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    pub iterations: usize,
    pub converged: bool,
}

/// Index of the nearest centroid by Manhattan distance; ties go to the lower index.
pub fn nearest(p: Vec3, centroids: &[Vec3]) -> usize {
    let mut best = 0;
    let mut best_d = f32::INFINITY;
    for (j, c) in centroids.iter().enumerate() {
        let d = c.manhattan(p);
        if j == 0 || d < best_d {
            best = j;
            best_d = d;
        }
    }
    best
}

pub fn assign(points: &[CloudPoint], centroids: &[Vec3]) -> Vec<usize> {
    points.iter().map(|p| nearest(p.pos, centroids)).collect()
}

/// Partition `points` into `k` clusters, seeding centroid `i` with point `i`.
pub fn kmeans(points: &[CloudPoint], k: usize, cfg: &KMeansConfig) -> Result<Clustering> {
    if k == 0 || k > points.len() {
        return Err(MocapError::Degenerate(format!(
            "cannot form {k} clusters from {} markers",
            points.len()
        )));
    }

    let mut centroids: Vec<Vec3> = points[..k].iter().map(|p| p.pos).collect();
    let mut labels = assign(points, &centroids);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < cfg.max_iterations {
        iterations += 1;
        let mut moved = false;
        for (i, c) in centroids.iter_mut().enumerate() {
            let members = points
                .iter()
                .zip(&labels)
                .filter(|(_, l)| **l == i)
                .map(|(p, _)| p.pos);
            let Some(next) = Vec3::mean(members) else {
                warn!(cluster = i, "empty cluster keeps its previous centroid");
                continue;
            };
            if next.max_axis_delta(*c) > cfg.tolerance {
                *c = next;
                moved = true;
            }
        }
        if !moved {
            converged = true;
            break;
        }
        labels = assign(points, &centroids);
    }
    if !converged {
        warn!(iterations, "k-means stopped at the iteration cap");
    }

    let clusters: Vec<Cluster> = centroids
        .into_iter()
        .enumerate()
        .map(|(i, centroid)| {
            let members: Vec<CloudPoint> = points
                .iter()
                .zip(&labels)
                .filter(|(_, l)| **l == i)
                .map(|(p, _)| *p)
                .collect();
            debug!(cluster = i, size = members.len(), "cluster formed");
            Cluster {
                name: format!("Cluster_{} ({})", i, members.len()),
                members,
                centroid,
                color: Color::random(i),
                point_size: DEFAULT_POINT_SIZE,
                visible: true,
            }
        })
        .collect();
    info!(k, iterations, converged, "k-means finished");
    Ok(Clustering {
        clusters,
        iterations,
        converged,
    })
}
