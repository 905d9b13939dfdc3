//! Named export outputs offered to the user

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Something the user can export from a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportTarget {
    /// The reconstructed surface
    SurfaceModel,
    /// The captured samples
    Points,
}

impl ExportTarget {
    pub const ALL: [ExportTarget; 2] = [ExportTarget::SurfaceModel, ExportTarget::Points];

    /// Default file stem
    pub fn default_name(&self) -> &'static str {
        match self {
            ExportTarget::SurfaceModel => "SurfaceModel",
            ExportTarget::Points => "Points",
        }
    }

    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ExportTarget::SurfaceModel => Some("stl"),
            ExportTarget::Points => None,
        }
    }

    /// Default file name, with extension when the target has one
    pub fn default_file_name(&self) -> String {
        match self.extension() {
            Some(ext) => format!("{}.{}", self.default_name(), ext),
            None => self.default_name().to_string(),
        }
    }

    /// Default path of this target inside `dir`
    pub fn default_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(self.default_file_name())
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_names() {
        assert_eq!(ExportTarget::SurfaceModel.default_file_name(), "SurfaceModel.stl");
        assert_eq!(ExportTarget::Points.default_file_name(), "Points");
    }

    #[test]
    fn test_default_path() {
        let path = ExportTarget::SurfaceModel.default_path("/tmp/scans");
        assert_eq!(path, PathBuf::from("/tmp/scans/SurfaceModel.stl"));
        assert_eq!(ExportTarget::ALL.len(), 2);
        assert_eq!(ExportTarget::Points.to_string(), "Points");
    }
}
