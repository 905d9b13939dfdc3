//! Camera poses reported by the tracking subsystem

use crate::point::{Point3f, Viewpoint};
use nalgebra::{Isometry3, Matrix4, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Camera-to-world transform of a tracked frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub matrix: Matrix4<f32>,
}

impl CameraPose {
    /// Create an identity pose (camera at the world origin)
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a pose from a camera position and orientation
    pub fn from_translation_rotation(
        translation: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
    ) -> Self {
        let isometry = Isometry3::from_parts(translation.into(), rotation);
        Self {
            matrix: isometry.to_homogeneous(),
        }
    }

    /// World-space camera origin, i.e. the translation column of the transform
    pub fn viewpoint(&self) -> Viewpoint {
        let column = self.matrix.column(3);
        Point3f::new(column[0], column[1], column[2])
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix4<f32>> for CameraPose {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}

impl From<Isometry3<f32>> for CameraPose {
    fn from(isometry: Isometry3<f32>) -> Self {
        Self {
            matrix: isometry.to_homogeneous(),
        }
    }
}
