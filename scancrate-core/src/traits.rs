//! Core traits for scancrate

use crate::{point::*, scan_cloud::ScanCloud};

/// Trait for nearest neighbor search functionality
pub trait NearestNeighborSearch {
    /// Find the k nearest neighbors to a query point
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)>;

    /// Find all neighbors within a given radius
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)>;
}

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

/// Axis-aligned bounds of a set of points, origin for an empty set
pub fn bounds_of<'a, I>(points: I) -> (Point3f, Point3f)
where
    I: IntoIterator<Item = &'a Point3f>,
{
    let mut points = points.into_iter();
    let Some(first) = points.next() else {
        return (Point3f::origin(), Point3f::origin());
    };

    let mut min = *first;
    let mut max = *first;
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);

        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }
    (min, max)
}

impl Drawable for ScanCloud {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.points())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_cloud_bounds() {
        let mut cloud = ScanCloud::new();
        cloud.append(
            vec![Point3f::new(-1.0, 2.0, 0.0), Point3f::new(3.0, -2.0, 1.0)],
            None,
        );
        let (min, max) = cloud.bounding_box();
        assert_eq!(min, Point3f::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Point3f::new(3.0, 2.0, 1.0));
        assert_eq!(cloud.center(), Point3f::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn test_empty_bounds_are_origin() {
        let cloud = ScanCloud::new();
        assert_eq!(cloud.bounding_box(), (Point3f::origin(), Point3f::origin()));
    }
}
