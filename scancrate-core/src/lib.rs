//! Core data structures and traits for scancrate
//!
//! This crate provides the fundamental types shared by the scanning pipeline:
//! samples and viewpoints, the frame-structured [`ScanCloud`] accumulated while
//! scanning, camera poses, and essential traits.

pub mod point;
pub mod scan_cloud;
pub mod camera;
pub mod traits;
pub mod error;

pub use point::*;
pub use scan_cloud::*;
pub use camera::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4, Isometry3, UnitQuaternion};
