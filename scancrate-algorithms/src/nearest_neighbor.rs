//! Nearest neighbor search backed by an R*-tree

use rstar::{primitives::GeomWithData, PointDistance, RTree};
use scancrate_core::{NearestNeighborSearch, Point3f};

type IndexedPoint = GeomWithData<[f32; 3], usize>;

/// Spatial index over a slice of finite points.
///
/// Returned indices refer to positions in the slice the index was built from.
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl PointIndex {
    pub fn new(points: &[Point3f]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(idx, p)| GeomWithData::new([p.x, p.y, p.z], idx))
            .collect::<Vec<_>>();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl NearestNeighborSearch for PointIndex {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let q = [query.x, query.y, query.z];
        self.tree
            .nearest_neighbor_iter(&q)
            .take(k)
            .map(|n| (n.data, n.distance_2(&q).sqrt()))
            .collect()
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        let q = [query.x, query.y, query.z];
        self.tree
            .locate_within_distance(q, radius * radius)
            .map(|n| (n.data, n.distance_2(&q).sqrt()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line() -> Vec<Point3f> {
        (0..5).map(|i| Point3f::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_k_nearest_sorted_by_distance() {
        let index = PointIndex::new(&line());
        let neighbors = index.find_k_nearest(&Point3f::new(1.1, 0.0, 0.0), 3);

        assert_eq!(neighbors.len(), 3);
        assert_eq!(neighbors[0].0, 1);
        assert_eq!(neighbors[1].0, 2);
        assert_eq!(neighbors[2].0, 0);
        assert_relative_eq!(neighbors[0].1, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn test_radius_neighbors() {
        let index = PointIndex::new(&line());
        let mut found: Vec<usize> = index
            .find_radius_neighbors(&Point3f::new(2.0, 0.0, 0.0), 1.0)
            .into_iter()
            .map(|(idx, _)| idx)
            .collect();
        found.sort_unstable();
        assert_eq!(found, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_index() {
        let index = PointIndex::new(&[]);
        assert!(index.is_empty());
        assert!(index.find_k_nearest(&Point3f::origin(), 4).is_empty());
    }
}
