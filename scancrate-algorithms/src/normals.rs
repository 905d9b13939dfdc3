//! Normal estimation algorithms

use crate::nearest_neighbor::PointIndex;
use nalgebra::{Matrix3, SymmetricEigen};
use rayon::prelude::*;
use scancrate_core::{
    Error, NearestNeighborSearch, NormalPoint3f, Point3f, Result, Vector3f, Viewpoint,
};

const MIN_NEIGHBORS: usize = 3;

/// Estimate a normal for every point from its `k` nearest neighbors and orient
/// it toward `viewpoint`.
///
/// The normal is the eigenvector of the neighborhood covariance with the
/// smallest eigenvalue, flipped so that it faces the camera that observed the
/// point. Points with fewer than three neighbors get `None`.
pub fn estimate_normals_toward(
    points: &[Point3f],
    k: usize,
    viewpoint: &Viewpoint,
) -> Result<Vec<Option<Vector3f>>> {
    if k < MIN_NEIGHBORS {
        return Err(Error::InvalidData(format!(
            "k must be at least {} for normal estimation",
            MIN_NEIGHBORS
        )));
    }

    let index = PointIndex::new(points);
    let normals = points
        .par_iter()
        .map(|point| {
            let neighbors = index.find_k_nearest(point, k);
            if neighbors.len() < MIN_NEIGHBORS {
                return None;
            }

            let centroid = neighbors
                .iter()
                .fold(Vector3f::zeros(), |acc, (idx, _)| acc + points[*idx].coords)
                / neighbors.len() as f32;

            let mut covariance = Matrix3::<f32>::zeros();
            for (idx, _) in &neighbors {
                let deviation = points[*idx].coords - centroid;
                covariance += deviation * deviation.transpose();
            }
            covariance /= neighbors.len() as f32;

            let eigen = SymmetricEigen::new(covariance);
            let (smallest, _) = eigen
                .eigenvalues
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
            let normal: Vector3f = eigen.eigenvectors.column(smallest).into_owned();
            let norm = normal.norm();
            if !norm.is_finite() || norm < 1e-12 {
                return None;
            }
            let normal = normal / norm;

            if (viewpoint - point).dot(&normal) < 0.0 {
                Some(-normal)
            } else {
                Some(normal)
            }
        })
        .collect();

    Ok(normals)
}

/// Pair points with their oriented normals, dropping points without one
pub fn oriented_point_normals(
    points: &[Point3f],
    k: usize,
    viewpoint: &Viewpoint,
) -> Result<Vec<NormalPoint3f>> {
    let normals = estimate_normals_toward(points, k, viewpoint)?;
    Ok(points
        .iter()
        .zip(normals)
        .filter_map(|(position, normal)| normal.map(|n| NormalPoint3f::new(*position, n)))
        .collect())
}
