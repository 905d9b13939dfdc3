//! In-memory scene that records what a display would show

use crate::surface::RenderableSurface;
use crate::view::{Notice, ScanView};
use bytemuck::{Pod, Zeroable};
use scancrate_core::{bounds_of, Drawable, Point3f, Sample};
use serde::{Deserialize, Serialize};

/// Marker drawn for a captured sample
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointMarker {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub radius: f32,
}

/// Appearance of sample markers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub color: [f32; 3],
    pub radius: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            radius: 0.00066,
        }
    }
}

impl MarkerStyle {
    pub fn marker(&self, sample: &Sample) -> PointMarker {
        PointMarker {
            position: [sample.x, sample.y, sample.z],
            color: self.color,
            radius: self.radius,
        }
    }
}

/// Scene graph stand-in: sample markers, at most one surface, control flags
/// and the notices posted so far.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    style: MarkerStyle,
    markers: Vec<PointMarker>,
    surface: Option<RenderableSurface>,
    surface_visible: bool,
    capture_active: bool,
    reconstruct_enabled: bool,
    feature_points_visible: bool,
    notices: Vec<Notice>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker_style(style: MarkerStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn markers(&self) -> &[PointMarker] {
        &self.markers
    }

    pub fn surface(&self) -> Option<&RenderableSurface> {
        self.surface.as_ref()
    }

    pub fn is_surface_visible(&self) -> bool {
        self.surface_visible
    }

    pub fn is_capture_active(&self) -> bool {
        self.capture_active
    }

    pub fn is_reconstruct_enabled(&self) -> bool {
        self.reconstruct_enabled
    }

    pub fn are_feature_points_visible(&self) -> bool {
        self.feature_points_visible
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Most recent notice, if any
    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl ScanView for Scene {
    fn set_capture_active(&mut self, active: bool) {
        self.capture_active = active;
    }

    fn set_reconstruct_enabled(&mut self, enabled: bool) {
        self.reconstruct_enabled = enabled;
    }

    fn set_feature_points_visible(&mut self, visible: bool) {
        self.feature_points_visible = visible;
    }

    fn show_samples(&mut self, samples: &mut dyn Iterator<Item = &Sample>) {
        let style = self.style;
        let before = self.markers.len();
        self.markers.extend(samples.map(|s| style.marker(s)));
        log::debug!("added {} sample markers", self.markers.len() - before);
    }

    fn replace_surface(&mut self, surface: RenderableSurface) {
        if let Some(old) = self.surface.take() {
            log::debug!("removed surface with {} triangles", old.triangle_count());
        }
        self.surface = Some(surface);
    }

    fn set_surface_visible(&mut self, visible: bool) {
        self.surface_visible = visible;
    }

    fn clear_scene(&mut self) {
        self.markers.clear();
        self.surface = None;
        self.surface_visible = false;
    }

    fn notify(&mut self, notice: Notice) {
        log::info!("{}", notice);
        self.notices.push(notice);
    }
}

impl Drawable for Scene {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        let mut points: Vec<Point3f> = self
            .markers
            .iter()
            .map(|m| Point3f::from(m.position))
            .collect();
        if let Some(surface) = &self.surface {
            points.extend(surface.vertices.iter().map(|v| v.point()));
        }
        bounds_of(&points)
    }
}
