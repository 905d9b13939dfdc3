//! Poisson surface reconstruction engine

use crate::engine::{EngineMesh, ReconstructionEngine};
use crate::request::{ReconstructionRequest, RequestFrame};
use rayon::prelude::*;
use scancrate_algorithms::{
    finite_points, oriented_point_normals, statistical_outlier_mask,
    statistical_outlier_removal, StatisticalFilter,
};
use scancrate_core::{bounds_of, Error, NormalPoint3f, Point3f, Result};
use serde::{Deserialize, Serialize};

/// Configuration parameters for the Poisson engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoissonEngineConfig {
    /// Filter each frame on its own before estimating normals (default: true)
    pub filter_frames: bool,
    /// Number of neighbors used for normal estimation (default: 10)
    pub normal_k: usize,
    /// Filter applied to the merged, oriented cloud (default: k=50, mul=3.0)
    pub global_filter: Option<(usize, f32)>,
    /// The maximum depth of the octree (default: 5)
    pub depth: usize,
    /// Depth of the octree used for density estimation (default: 5)
    pub density_estimation_depth: usize,
    /// Weight given to point interpolation, a.k.a. screening (default: 4.0)
    pub point_weight: f64,
    /// Number of gauss-seidel relaxations performed at each level (default: 8)
    pub max_relaxation_iters: usize,
    /// Fewest oriented points worth reconstructing (default: 10)
    pub min_points: usize,
}

impl Default for PoissonEngineConfig {
    fn default() -> Self {
        Self {
            filter_frames: true,
            normal_k: 10,
            global_filter: Some((50, 3.0)),
            depth: 5,
            density_estimation_depth: 5,
            point_weight: 4.0,
            max_relaxation_iters: 8,
            min_points: 10,
        }
    }
}

impl PoissonEngineConfig {
    /// Set the octree depth, lowering the density estimation depth to match if needed
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self.density_estimation_depth = self.density_estimation_depth.min(depth);
        self
    }

    /// Set the density estimation depth; must not exceed the octree depth
    pub fn with_density_estimation_depth(mut self, depth: usize) -> Self {
        self.density_estimation_depth = depth;
        self
    }

    /// Set the screening weight, 0 disables screening
    pub fn with_point_weight(mut self, weight: f64) -> Self {
        self.point_weight = weight;
        self
    }

    /// Set the number of relaxation passes per octree level
    pub fn with_max_relaxation_iters(mut self, iters: usize) -> Self {
        self.max_relaxation_iters = iters;
        self
    }

    /// Set the neighbor count for normal estimation
    pub fn with_normal_k(mut self, k: usize) -> Self {
        self.normal_k = k;
        self
    }

    /// Set or disable the global statistical filter
    pub fn with_global_filter(mut self, filter: Option<(usize, f32)>) -> Self {
        self.global_filter = filter;
        self
    }

    /// Enable or disable per-frame filtering
    pub fn with_frame_filtering(mut self, enabled: bool) -> Self {
        self.filter_frames = enabled;
        self
    }
}

/// Clouds whose bounding box is smaller than this along every axis cannot be meshed
const MIN_EXTENT: f32 = 1e-6;

/// Clouds whose second principal variance is below this fraction of the largest are a line
const MIN_SPREAD_RATIO: f64 = 1e-6;

/// Variances of `points` along their principal axes, largest first
fn principal_variances(points: &[nalgebra::Point3<f64>]) -> nalgebra::Vector3<f64> {
    let count = points.len().max(1) as f64;
    let centroid = points
        .iter()
        .fold(nalgebra::Vector3::<f64>::zeros(), |acc, p| acc + p.coords)
        / count;

    let mut covariance = nalgebra::Matrix3::<f64>::zeros();
    for point in points {
        let deviation = point.coords - centroid;
        covariance += deviation * deviation.transpose();
    }
    covariance /= count;

    let mut variances = nalgebra::SymmetricEigen::new(covariance).eigenvalues;
    variances
        .as_mut_slice()
        .sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    variances
}

/// Reconstruction engine built on the `poisson_reconstruction` crate.
///
/// Each frame is cleaned with a statistical filter sized to the frame and gets
/// normals oriented toward the camera that captured it. The merged cloud is
/// filtered once more and handed to screened Poisson reconstruction.
#[derive(Debug, Clone, Default)]
pub struct PoissonEngine {
    config: PoissonEngineConfig,
}

impl PoissonEngine {
    pub fn new(config: PoissonEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PoissonEngineConfig {
        &self.config
    }

    /// Build the oriented cloud the surface is reconstructed from
    pub fn oriented_cloud(&self, request: &ReconstructionRequest) -> Result<Vec<NormalPoint3f>> {
        let frames: Vec<RequestFrame<'_>> = request.frames().collect();
        let per_frame = frames
            .par_iter()
            .map(|frame| self.orient_frame(frame))
            .collect::<Result<Vec<_>>>()?;
        let merged: Vec<NormalPoint3f> = per_frame.into_iter().flatten().collect();

        let Some((mean_k, std_dev_mul)) = self.config.global_filter else {
            return Ok(merged);
        };
        let positions: Vec<Point3f> = merged.iter().map(|p| p.position).collect();
        let mask = statistical_outlier_mask(&positions, &StatisticalFilter::new(mean_k, std_dev_mul))?;
        let filtered: Vec<NormalPoint3f> = merged
            .into_iter()
            .zip(mask)
            .filter_map(|(point, keep)| keep.then_some(point))
            .collect();

        log::debug!("oriented cloud has {} points after global filtering", filtered.len());
        Ok(filtered)
    }

    fn orient_frame(&self, frame: &RequestFrame<'_>) -> Result<Vec<NormalPoint3f>> {
        let samples: Vec<Point3f> = frame
            .points
            .iter()
            .map(|p| Point3f::new(p[0] as f32, p[1] as f32, p[2] as f32))
            .collect();
        let samples = finite_points(&samples);
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let samples = if self.config.filter_frames {
            statistical_outlier_removal(&samples, &StatisticalFilter::for_frame(samples.len()))?
        } else {
            samples
        };

        let viewpoint = Point3f::new(
            frame.viewpoint[0] as f32,
            frame.viewpoint[1] as f32,
            frame.viewpoint[2] as f32,
        );
        oriented_point_normals(&samples, self.config.normal_k, &viewpoint)
    }

    fn reconstruct_surface(&self, cloud: &[NormalPoint3f]) -> Result<EngineMesh> {
        if cloud.len() < self.config.min_points {
            return Err(Error::InvalidData(format!(
                "Point cloud too small for Poisson reconstruction ({} < {} points)",
                cloud.len(),
                self.config.min_points
            )));
        }
        if self.config.density_estimation_depth > self.config.depth {
            return Err(Error::InvalidData(format!(
                "density estimation depth {} exceeds octree depth {}",
                self.config.density_estimation_depth, self.config.depth
            )));
        }

        let positions: Vec<Point3f> = cloud.iter().map(|p| p.position).collect();
        let (min, max) = bounds_of(&positions);
        let extent = (max - min).amax();
        if extent < MIN_EXTENT {
            return Err(Error::InvalidData(format!(
                "Point cloud extent {} is too small for Poisson reconstruction",
                extent
            )));
        }

        let points: Vec<nalgebra::Point3<f64>> = cloud
            .iter()
            .map(|p| nalgebra::Point3::new(p.position.x as f64, p.position.y as f64, p.position.z as f64))
            .collect();
        let normals: Vec<nalgebra::Vector3<f64>> = cloud
            .iter()
            .map(|p| nalgebra::Vector3::new(p.normal.x as f64, p.normal.y as f64, p.normal.z as f64))
            .collect();

        let variances = principal_variances(&points);
        if variances[1] < variances[0] * MIN_SPREAD_RATIO {
            log::debug!("principal variances of the oriented cloud: {:?}", variances.as_slice());
            return Err(Error::InvalidData(
                "Point cloud is collinear, there is no surface to reconstruct".to_string(),
            ));
        }

        let poisson = poisson_reconstruction::PoissonReconstruction::from_points_and_normals(
            &points,
            &normals,
            self.config.point_weight,
            self.config.density_estimation_depth,
            self.config.depth,
            self.config.max_relaxation_iters,
        );
        let mesh_buffers = poisson.reconstruct_mesh_buffers();

        let vertices: Vec<[f64; 3]> = mesh_buffers
            .vertices()
            .iter()
            .map(|v| [v.x, v.y, v.z])
            .collect();

        let indices = mesh_buffers.indices();
        if indices.len() % 3 != 0 {
            return Err(Error::Algorithm("Invalid triangle indices from Poisson reconstruction".to_string()));
        }
        let polygons = indices
            .chunks_exact(3)
            .map(|chunk| Ok([vertex_index(chunk[0])?, vertex_index(chunk[1])?, vertex_index(chunk[2])?]))
            .collect::<Result<Vec<[i32; 3]>>>()?;

        if vertices.is_empty() || polygons.is_empty() {
            return Err(Error::Algorithm("Poisson reconstruction produced an empty mesh".to_string()));
        }
        Ok(EngineMesh::new(vertices, polygons))
    }
}

fn vertex_index<T>(index: T) -> Result<i32>
where
    T: TryInto<i32> + Copy + std::fmt::Display,
{
    index
        .try_into()
        .map_err(|_| Error::Algorithm(format!("vertex index {} out of range", index)))
}

impl ReconstructionEngine for PoissonEngine {
    fn reconstruct(&self, request: &ReconstructionRequest) -> Option<EngineMesh> {
        let result = self
            .oriented_cloud(request)
            .and_then(|cloud| self.reconstruct_surface(&cloud));

        match result {
            Ok(mesh) => Some(mesh),
            Err(e) => {
                log::error!("Poisson reconstruction failed: {}", e);
                None
            }
        }
    }
}
