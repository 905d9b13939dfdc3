//! Display contract driven by the scanning session

use crate::surface::RenderableSurface;
use scancrate_core::Sample;
use std::fmt;

/// User-facing message posted by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A surface with `faces` triangles replaced the previous one
    SurfaceReconstructed { faces: usize },
    /// The engine produced nothing; nothing on screen changed
    ReconstructionFailed { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SurfaceReconstructed { faces } => {
                write!(f, "Surface reconstructed with {} faces", faces)
            }
            Notice::ReconstructionFailed { reason } => {
                write!(f, "Surface reconstruction failed: {}", reason)
            }
        }
    }
}

/// Everything the scanning session needs from a display.
///
/// Implementations own whatever they show. Samples passed to
/// [`show_samples`](ScanView::show_samples) are consumed during the call.
pub trait ScanView {
    /// Reflect the capture control state, `true` while capturing
    fn set_capture_active(&mut self, active: bool);

    /// Enable or disable the reconstruct action
    fn set_reconstruct_enabled(&mut self, enabled: bool);

    /// Show or hide the tracker's feature-point overlay
    fn set_feature_points_visible(&mut self, visible: bool);

    /// Draw each sample as a small marker
    fn show_samples(&mut self, samples: &mut dyn Iterator<Item = &Sample>);

    /// Swap in a new surface. The previous surface is gone before `surface` is attached.
    fn replace_surface(&mut self, surface: RenderableSurface);

    fn set_surface_visible(&mut self, visible: bool);

    /// Remove all markers and the surface
    fn clear_scene(&mut self);

    fn notify(&mut self, notice: Notice);
}
