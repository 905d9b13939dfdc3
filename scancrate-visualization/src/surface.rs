//! Renderable surfaces built from reconstructed meshes

use bytemuck::{Pod, Zeroable};
use scancrate_core::{bounds_of, Drawable, Point3f};
use scancrate_reconstruction::EngineMesh;
use serde::{Deserialize, Serialize};

/// Vertex data for surface rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
}

impl SurfaceVertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }

    pub fn point(&self) -> Point3f {
        Point3f::from(self.position)
    }
}

/// Shading model applied to a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightingModel {
    /// Unlit, flat color
    Constant,
    /// Diffuse-only shading
    Lambert,
    /// Blinn-Phong specular highlights
    Blinn,
    /// Physically based shading
    PhysicallyBased,
}

/// Appearance of a surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMaterial {
    /// Render back faces as well as front faces
    pub double_sided: bool,
    /// Diffuse RGBA color in 0..=1
    pub diffuse: [f32; 4],
    pub lighting_model: LightingModel,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            double_sided: true,
            diffuse: [135.0 / 255.0, 206.0 / 255.0, 250.0 / 255.0, 1.0],
            lighting_model: LightingModel::Blinn,
        }
    }
}

/// Vertex buffer plus triangle index buffer, ready to be uploaded for display.
///
/// Owns all of its data; nothing points back into the mesh it was built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderableSurface {
    pub vertices: Vec<SurfaceVertex>,
    pub triangles: Vec<[u32; 3]>,
    pub material: SurfaceMaterial,
}

impl RenderableSurface {
    /// Create a surface with no geometry and the default material
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the surface has nothing to draw
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.triangles.is_empty()
    }

    /// Triangle indices as a flat index buffer, three per triangle
    pub fn indices(&self) -> &[u32] {
        bytemuck::cast_slice(&self.triangles)
    }

    /// Raw vertex buffer contents
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Drawable for RenderableSurface {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        let points: Vec<Point3f> = self.vertices.iter().map(SurfaceVertex::point).collect();
        bounds_of(&points)
    }
}

/// Copy an engine mesh into a renderable surface with the default material.
///
/// Vertices are narrowed to `f32`. Triangles referencing a vertex outside the
/// mesh are skipped. A mesh without vertices or faces yields an empty surface.
/// The returned surface holds no reference into `mesh`, so the mesh can be
/// released as soon as this returns.
pub fn translate(mesh: &EngineMesh) -> RenderableSurface {
    if mesh.is_degenerate() {
        log::warn!(
            "degenerate mesh ({} vertices, {} faces), showing an empty surface",
            mesh.num_points(),
            mesh.num_faces()
        );
        return RenderableSurface::empty();
    }

    let vertices: Vec<SurfaceVertex> = mesh
        .points()
        .iter()
        .map(|p| SurfaceVertex::new(p[0] as f32, p[1] as f32, p[2] as f32))
        .collect();

    let vertex_count = vertices.len();
    let valid = |index: i32| -> Option<u32> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < vertex_count)
            .map(|i| i as u32)
    };

    let mut triangles = Vec::with_capacity(mesh.num_faces());
    let mut skipped = 0usize;
    for polygon in mesh.polygons() {
        match (valid(polygon[0]), valid(polygon[1]), valid(polygon[2])) {
            (Some(a), Some(b), Some(c)) => triangles.push([a, b, c]),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        log::warn!("skipped {} triangles with out-of-range vertex indices", skipped);
    }

    RenderableSurface {
        vertices,
        triangles,
        material: SurfaceMaterial::default(),
    }
}
