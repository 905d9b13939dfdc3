//! Scanning session controller
//!
//! Owns the scan cloud and drives the capture, reconstruct and reset actions,
//! keeping the display in step with the capture state.

use crate::capture::capture_step;
use crate::config::ScanConfig;
use crate::error::{Result, SessionError};
use crate::tracking::TrackingSource;
use scancrate_core::ScanCloud;
use scancrate_reconstruction::{build_and_submit, ReconstructionEngine};
use scancrate_visualization::{translate, Notice, ScanView};
use std::sync::Arc;

/// Whether the session is collecting samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    Capturing,
}

impl ScanState {
    /// Label for the capture control in this state
    pub fn capture_label(&self) -> &'static str {
        match self {
            ScanState::Idle => "Start Scan",
            ScanState::Capturing => "Stop Scan",
        }
    }
}

/// What a timer tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is idle, so nothing was polled
    NotCapturing,
    /// The tracker had nothing to offer
    NoDataAvailable,
    /// A frame was appended
    Captured { samples: usize, displayed: usize, posed: bool },
}

/// A scanning session bound to a tracker, an engine and a display.
///
/// Taking `&mut self` for every action keeps capture ticks and reconstruction
/// strictly sequential, so at most one request is ever in flight.
pub struct ScanSession<S, E: ?Sized, V> {
    source: S,
    engine: Arc<E>,
    view: V,
    cloud: ScanCloud,
    state: ScanState,
    config: ScanConfig,
}

impl<S, E, V> ScanSession<S, E, V>
where
    S: TrackingSource,
    E: ReconstructionEngine + ?Sized + 'static,
    V: ScanView,
{
    /// Start an idle session with an empty cloud
    pub fn new(source: S, engine: Arc<E>, view: V, config: ScanConfig) -> Self {
        let mut session = Self {
            source,
            engine,
            view,
            cloud: ScanCloud::new(),
            state: ScanState::Idle,
            config,
        };
        session.enter(ScanState::Idle);
        session
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn cloud(&self) -> &ScanCloud {
        &self.cloud
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Reconstruction is offered only while idle with something captured
    pub fn can_reconstruct(&self) -> bool {
        self.state == ScanState::Idle && !self.cloud.is_empty()
    }

    /// Start or stop capturing
    pub fn toggle_capture(&mut self) -> ScanState {
        let next = match self.state {
            ScanState::Idle => ScanState::Capturing,
            ScanState::Capturing => ScanState::Idle,
        };
        log::info!("{}", next.capture_label());
        self.enter(next);
        next
    }

    /// Capture timer callback, a no-op unless capturing
    pub fn on_timer_tick(&mut self) -> TickOutcome {
        if self.state != ScanState::Capturing {
            return TickOutcome::NotCapturing;
        }

        match capture_step(&mut self.source, &mut self.cloud, self.config.add_point_ratio) {
            None => {
                log::debug!("no tracking data this tick");
                TickOutcome::NoDataAvailable
            }
            Some(frame) => {
                let samples = frame.sample_count;
                let posed = frame.posed;
                let mut display = frame.display;
                let displayed = display.len();
                self.view.show_samples(&mut display);
                TickOutcome::Captured {
                    samples,
                    displayed,
                    posed,
                }
            }
        }
    }

    /// Reconstruct a surface from everything captured so far.
    ///
    /// On success the new surface replaces the old one and is shown, capture
    /// stops and the face count is returned. On failure the user is notified and
    /// neither the cloud, the surface nor the capture state change.
    ///
    /// Refused with [`SessionError::CaptureInProgress`] while capturing, so a
    /// successful run always starts and ends in [`ScanState::Idle`].
    pub fn reconstruct(&mut self) -> Result<usize> {
        if self.state == ScanState::Capturing {
            return Err(SessionError::CaptureInProgress);
        }

        let mesh = match build_and_submit(&self.cloud, &self.engine, &self.config.submit) {
            Ok(mesh) => mesh,
            Err(e) => {
                log::warn!("reconstruction failed: {}", e);
                self.view.notify(Notice::ReconstructionFailed {
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let surface = translate(&mesh);
        let faces = mesh.num_faces();
        mesh.release();

        self.view.replace_surface(surface);
        self.view.set_surface_visible(true);
        self.enter(ScanState::Idle);
        self.view.notify(Notice::SurfaceReconstructed { faces });
        Ok(faces)
    }

    /// Drop everything captured, clear the display and restart tracking
    pub fn reset(&mut self) {
        self.cloud.clear();
        self.view.clear_scene();
        self.enter(ScanState::Idle);
        self.source.restart();
        log::info!("session reset");
    }

    /// Take apart the session, returning the tracker and display
    pub fn into_parts(self) -> (S, V, ScanCloud) {
        (self.source, self.view, self.cloud)
    }

    fn enter(&mut self, state: ScanState) {
        self.state = state;
        let capturing = state == ScanState::Capturing;
        self.view.set_capture_active(capturing);
        self.view.set_feature_points_visible(capturing);
        self.view.set_reconstruct_enabled(self.can_reconstruct());
    }
}
