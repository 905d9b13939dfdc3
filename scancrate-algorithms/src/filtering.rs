//! Filtering algorithms

use crate::nearest_neighbor::PointIndex;
use rayon::prelude::*;
use scancrate_core::{Error, NearestNeighborSearch, Point3f, Result};

/// Parameters of a statistical outlier filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticalFilter {
    /// Number of nearest neighbors used to compute each point's mean distance
    pub mean_k: usize,
    /// Points whose mean distance exceeds `mean + std_dev_mul * std_dev` are removed
    pub std_dev_mul: f32,
}

impl StatisticalFilter {
    pub fn new(mean_k: usize, std_dev_mul: f32) -> Self {
        Self { mean_k, std_dev_mul }
    }

    /// Filter sized for a single sensor frame of `frame_len` samples: every other
    /// sample of the frame is a neighbor and the multiplier shrinks as the frame grows.
    pub fn for_frame(frame_len: usize) -> Self {
        Self {
            mean_k: frame_len.saturating_sub(1),
            std_dev_mul: 50.0 / frame_len.max(1) as f32,
        }
    }
}

impl Default for StatisticalFilter {
    fn default() -> Self {
        Self {
            mean_k: 50,
            std_dev_mul: 3.0,
        }
    }
}

/// Compute which points survive statistical outlier removal.
///
/// For each point the mean distance to its `mean_k` nearest neighbors (itself
/// excluded) is computed. With `mean` and `std_dev` the statistics of those mean
/// distances over the whole set, a point is kept when its mean distance is at most
/// `mean + std_dev_mul * std_dev`. Clouds with fewer than two points, or a
/// `mean_k` of zero, are kept untouched.
///
/// Points must have finite coordinates.
///
/// # Example
/// ```rust
/// use scancrate_core::Point3f;
/// use scancrate_algorithms::{statistical_outlier_mask, StatisticalFilter};
///
/// let mut points: Vec<Point3f> = (0..20)
///     .map(|i| Point3f::new((i % 5) as f32 * 0.1, (i / 5) as f32 * 0.1, 0.0))
///     .collect();
/// points.push(Point3f::new(50.0, 50.0, 50.0));
///
/// let mask = statistical_outlier_mask(&points, &StatisticalFilter::new(4, 1.0)).unwrap();
/// assert!(!mask[20]);
/// ```
pub fn statistical_outlier_mask(points: &[Point3f], filter: &StatisticalFilter) -> Result<Vec<bool>> {
    if !filter.std_dev_mul.is_finite() {
        return Err(Error::InvalidData(
            "std_dev_mul must be finite".to_string()
        ));
    }

    if points.len() < 2 || filter.mean_k == 0 {
        return Ok(vec![true; points.len()]);
    }

    let index = PointIndex::new(points);
    let k = filter.mean_k.min(points.len() - 1);

    let mean_distances: Vec<f32> = points
        .par_iter()
        .enumerate()
        .map(|(idx, point)| {
            let distances: Vec<f32> = index
                .find_k_nearest(point, k + 1)
                .into_iter()
                .filter(|(neighbor, _)| *neighbor != idx)
                .take(k)
                .map(|(_, distance)| distance)
                .collect();
            distances.iter().sum::<f32>() / distances.len().max(1) as f32
        })
        .collect();

    let n = mean_distances.len() as f64;
    let sum: f64 = mean_distances.iter().map(|&d| d as f64).sum();
    let sum_sq: f64 = mean_distances.iter().map(|&d| (d as f64) * (d as f64)).sum();
    let mean = sum / n;
    let variance = ((sum_sq - sum * sum / n) / (n - 1.0)).max(0.0);
    let threshold = mean + filter.std_dev_mul as f64 * variance.sqrt();

    Ok(mean_distances
        .iter()
        .map(|&d| (d as f64) <= threshold)
        .collect())
}

/// Remove statistical outliers, see [`statistical_outlier_mask`]
pub fn statistical_outlier_removal(points: &[Point3f], filter: &StatisticalFilter) -> Result<Vec<Point3f>> {
    let mask = statistical_outlier_mask(points, filter)?;
    let kept: Vec<Point3f> = points
        .iter()
        .zip(mask)
        .filter_map(|(point, keep)| keep.then_some(*point))
        .collect();

    log::debug!(
        "statistical filter (k={}, mul={}) kept {}/{} points",
        filter.mean_k,
        filter.std_dev_mul,
        kept.len(),
        points.len()
    );
    Ok(kept)
}

/// Drop samples with NaN or infinite coordinates
pub fn finite_points(points: &[Point3f]) -> Vec<Point3f> {
    points
        .iter()
        .filter(|p| p.iter().all(|c| c.is_finite()))
        .copied()
        .collect()
}
