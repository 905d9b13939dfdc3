//! # ScanCrate Algorithms
//!
//! Point cloud processing used on the way from raw sensor samples to a
//! reconstruction-ready cloud: spatial indexing, statistical outlier removal and
//! viewpoint-oriented normal estimation.

pub mod filtering;
pub mod normals;
pub mod nearest_neighbor;

// Re-export commonly used items
pub use filtering::*;
pub use normals::*;
pub use nearest_neighbor::*;
