//! End-to-end scanning session tests

use approx::assert_relative_eq;
use scancrate_capture::*;
use scancrate_core::{CameraPose, Isometry3, Point3f, Sample};
use scancrate_reconstruction::{EngineMesh, ReconstructionEngine, ReconstructionRequest};
use scancrate_visualization::{Notice, Scene};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn samples(n: usize, offset: f32) -> Vec<Sample> {
    (0..n).map(|i| Point3f::new(offset + i as f32, 0.5, -1.0)).collect()
}

fn pose(x: f32) -> CameraPose {
    CameraPose::from(Isometry3::translation(x, 0.0, 2.0))
}

/// Returns a quad for every request until told to fail, counting releases
#[derive(Default)]
struct SwitchableEngine {
    fail: AtomicBool,
    released: Arc<AtomicUsize>,
    requests: Mutex<Vec<ReconstructionRequest>>,
}

impl ReconstructionEngine for SwitchableEngine {
    fn reconstruct(&self, request: &ReconstructionRequest) -> Option<EngineMesh> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.fail.load(Ordering::SeqCst) {
            return None;
        }
        let released = self.released.clone();
        Some(
            EngineMesh::new(
                vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
                vec![[0, 1, 2], [0, 2, 3]],
            )
            .with_release(move || {
                released.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }
}

fn capture_all(session: &mut ScanSession<RecordedSource, SwitchableEngine, Scene>, ticks: usize) {
    session.toggle_capture();
    for _ in 0..ticks {
        session.on_timer_tick();
    }
    session.toggle_capture();
}

#[test]
fn test_frame_bookkeeping_over_ticks() {
    let source = RecordedSource::new(vec![
        Some(TrackingFrame::posed(samples(5, 0.0), pose(1.0))),
        Some(TrackingFrame::new(Some(Vec::new()), None)),
        None,
        Some(TrackingFrame::posed(samples(7, 10.0), pose(3.0))),
    ]);
    let engine = Arc::new(SwitchableEngine::default());
    let mut session = ScanSession::new(source, engine, Scene::new(), ScanConfig::default());
    capture_all(&mut session, 4);

    let cloud = session.cloud();
    assert_eq!(cloud.len(), 12);
    assert_eq!(cloud.frame_sizes(), &[5, 0, 7]);
    assert_eq!(cloud.frame_viewpoints().len(), 2);
    assert_eq!(cloud.frame_sizes().iter().sum::<usize>(), cloud.len());
    assert_relative_eq!(cloud.frame_viewpoints()[1].x, 3.0);

    // ceil(5 / 3) + ceil(7 / 3) markers
    assert_eq!(session.view().markers().len(), 2 + 3);
}

#[test]
fn test_reconstruction_request_matches_capture() {
    let source = RecordedSource::new(vec![
        Some(TrackingFrame::posed(samples(5, 0.0), pose(1.0))),
        Some(TrackingFrame::posed(samples(4, 10.0), pose(2.0))),
    ]);
    let engine = Arc::new(SwitchableEngine::default());
    let mut session = ScanSession::new(source, engine.clone(), Scene::new(), ScanConfig::default());
    capture_all(&mut session, 2);

    assert_eq!(session.reconstruct().unwrap(), 2);

    let requests = engine.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].frame_sizes(), &[5, 4]);
    assert_eq!(requests[0].viewpoints(), &[[1.0, 0.0, 2.0], [2.0, 0.0, 2.0]]);
    assert_eq!(requests[0].points()[5], [10.0, 0.5, -1.0]);
}

#[test]
fn test_engine_failure_leaves_state_unchanged() {
    let source = RecordedSource::new(vec![
        Some(TrackingFrame::posed(samples(6, 0.0), pose(1.0))),
        Some(TrackingFrame::posed(samples(3, 10.0), pose(2.0))),
    ]);
    let engine = Arc::new(SwitchableEngine::default());
    let mut session = ScanSession::new(source, engine.clone(), Scene::new(), ScanConfig::default());

    capture_all(&mut session, 1);
    session.reconstruct().unwrap();
    let surface_before = session.view().surface().cloned();
    assert!(surface_before.is_some());

    capture_all(&mut session, 1);
    let cloud_before = session.cloud().clone();
    engine.fail.store(true, Ordering::SeqCst);

    let result = session.reconstruct();
    assert!(matches!(result, Err(SessionError::Reconstruction(_))));
    assert_eq!(session.cloud(), &cloud_before);
    assert_eq!(session.view().surface().cloned(), surface_before);
    assert_eq!(session.state(), ScanState::Idle);
    assert!(matches!(
        session.view().last_notice(),
        Some(Notice::ReconstructionFailed { .. })
    ));
}

#[test]
fn test_mesh_released_once_per_reconstruction() {
    let source = RecordedSource::new(vec![Some(TrackingFrame::posed(samples(4, 0.0), pose(1.0)))]);
    let engine = Arc::new(SwitchableEngine::default());
    let released = engine.released.clone();
    let mut session = ScanSession::new(source, engine, Scene::new(), ScanConfig::default());
    capture_all(&mut session, 1);

    session.reconstruct().unwrap();
    assert_eq!(released.load(Ordering::SeqCst), 1);
    session.reconstruct().unwrap();
    assert_eq!(released.load(Ordering::SeqCst), 2);
}

#[test]
fn test_reconstruct_empty_session_fails() {
    let engine = Arc::new(SwitchableEngine::default());
    let mut session = ScanSession::new(RecordedSource::default(), engine.clone(), Scene::new(), ScanConfig::default());

    assert!(session.reconstruct().is_err());
    assert!(engine.requests.lock().unwrap().is_empty());
    assert_eq!(session.view().notices().len(), 1);
}

#[test]
fn test_reset_then_capture_again() {
    let source = RecordedSource::new(vec![
        Some(TrackingFrame::posed(samples(5, 0.0), pose(1.0))),
        Some(TrackingFrame::posed(samples(2, 10.0), pose(2.0))),
    ]);
    let engine = Arc::new(SwitchableEngine::default());
    let mut session = ScanSession::new(source, engine, Scene::new(), ScanConfig::default());

    capture_all(&mut session, 1);
    session.reconstruct().unwrap();
    session.reset();
    assert!(session.view().surface().is_none());
    assert!(!session.can_reconstruct());

    capture_all(&mut session, 1);
    assert_eq!(session.cloud().frame_sizes(), &[2]);
    assert!(session.can_reconstruct());
}
