//! Contract between the scanning pipeline and a surface reconstruction engine

use crate::request::ReconstructionRequest;
use std::fmt;
use std::sync::Arc;

/// A surface reconstruction algorithm.
///
/// `reconstruct` runs on a background thread and may take as long as it needs.
/// Returning `None` signals that the engine could not produce a mesh.
pub trait ReconstructionEngine: Send + Sync {
    fn reconstruct(&self, request: &ReconstructionRequest) -> Option<EngineMesh>;
}

impl<E: ReconstructionEngine + ?Sized> ReconstructionEngine for Arc<E> {
    fn reconstruct(&self, request: &ReconstructionRequest) -> Option<EngineMesh> {
        (**self).reconstruct(request)
    }
}

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Triangle mesh handed over by an engine.
///
/// Vertex indices are 0-based into `points`. Engines that allocate the
/// buffers themselves attach a release hook with [`EngineMesh::with_release`];
/// the hook runs exactly once, when the mesh is dropped or [`released`](EngineMesh::release),
/// whichever path the caller takes.
pub struct EngineMesh {
    points: Vec<[f64; 3]>,
    polygons: Vec<[i32; 3]>,
    release: Option<ReleaseHook>,
}

impl EngineMesh {
    pub fn new(points: Vec<[f64; 3]>, polygons: Vec<[i32; 3]>) -> Self {
        Self {
            points,
            polygons,
            release: None,
        }
    }

    /// Mesh with no vertices and no faces
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Attach the hook that frees engine-side storage backing this mesh
    pub fn with_release<F>(mut self, release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.release = Some(Box::new(release));
        self
    }

    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    pub fn polygons(&self) -> &[[i32; 3]] {
        &self.polygons
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_faces(&self) -> usize {
        self.polygons.len()
    }

    /// Whether the mesh has no vertices or no faces
    pub fn is_degenerate(&self) -> bool {
        self.points.is_empty() || self.polygons.is_empty()
    }

    /// Give the mesh back to the engine now
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for EngineMesh {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for EngineMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineMesh")
            .field("num_points", &self.points.len())
            .field("num_faces", &self.polygons.len())
            .field("has_release_hook", &self.release.is_some())
            .finish()
    }
}
