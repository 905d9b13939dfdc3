//! Running a reconstruction on a background thread and waiting for its result

use crate::engine::{EngineMesh, ReconstructionEngine};
use crate::error::{ReconstructionError, Result};
use crate::request::{ReconstructionRequest, UnposedFramePolicy};
use scancrate_core::ScanCloud;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Options for submitting a request to an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOptions {
    /// Maximum time to wait for the engine (None = wait indefinitely)
    pub timeout: Option<Duration>,
    /// How frames captured without a camera pose are flattened
    pub unposed_frames: UnposedFramePolicy,
    /// Name given to the worker thread
    pub thread_name: String,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            unposed_frames: UnposedFramePolicy::CarryForward,
            thread_name: "scancrate-recon".to_string(),
        }
    }
}

impl SubmitOptions {
    /// Set the wait timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the unposed frame policy
    pub fn with_unposed_frames(mut self, policy: UnposedFramePolicy) -> Self {
        self.unposed_frames = policy;
        self
    }

    /// Set the worker thread name
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// Flatten `cloud` and reconstruct it, blocking until the engine answers.
///
/// The cloud is only read while the request is built, before the worker starts.
/// On success the caller owns the returned mesh and releases it by dropping it.
pub fn build_and_submit<E>(
    cloud: &ScanCloud,
    engine: &Arc<E>,
    options: &SubmitOptions,
) -> Result<EngineMesh>
where
    E: ReconstructionEngine + ?Sized + 'static,
{
    let request = ReconstructionRequest::from_cloud(cloud, options.unposed_frames)?;
    submit(request, engine, options)
}

/// Run `request` through `engine` on a dedicated thread and wait for the result.
///
/// The request moves to the worker, so its buffers live until the engine is done
/// with them. When a timeout expires the worker is left to finish; a mesh it
/// produces afterwards is released on the worker thread.
pub fn submit<E>(
    request: ReconstructionRequest,
    engine: &Arc<E>,
    options: &SubmitOptions,
) -> Result<EngineMesh>
where
    E: ReconstructionEngine + ?Sized + 'static,
{
    let (sender, receiver) = flume::bounded::<Option<EngineMesh>>(1);
    let engine = Arc::clone(engine);
    let num_points = request.num_points();
    let num_frames = request.num_frames();

    log::info!(
        "submitting reconstruction: {} points in {} frames",
        num_points,
        num_frames
    );
    let started = Instant::now();

    thread::Builder::new()
        .name(options.thread_name.clone())
        .spawn(move || {
            let mesh = engine.reconstruct(&request);
            if sender.send(mesh).is_err() {
                log::warn!("reconstruction finished after the caller stopped waiting");
            }
        })?;

    let outcome = match options.timeout {
        Some(timeout) => receiver.recv_timeout(timeout).map_err(|e| match e {
            flume::RecvTimeoutError::Timeout => ReconstructionError::Timeout(timeout),
            flume::RecvTimeoutError::Disconnected => ReconstructionError::WorkerLost,
        })?,
        None => receiver
            .recv()
            .map_err(|_| ReconstructionError::WorkerLost)?,
    };

    match outcome {
        Some(mesh) => {
            log::info!(
                "reconstruction finished in {:?}: {} vertices, {} faces",
                started.elapsed(),
                mesh.num_points(),
                mesh.num_faces()
            );
            Ok(mesh)
        }
        None => {
            log::warn!("reconstruction engine returned no mesh after {:?}", started.elapsed());
            Err(ReconstructionError::EngineFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scancrate_core::Point3f;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cloud() -> ScanCloud {
        let mut cloud = ScanCloud::new();
        cloud.append(
            vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0), Point3f::new(0.0, 1.0, 0.0)],
            Some(Point3f::new(0.0, 0.0, 1.0)),
        );
        cloud
    }

    /// Echoes the request points back as a single triangle
    struct TriangleEngine {
        released: Arc<AtomicUsize>,
    }

    impl ReconstructionEngine for TriangleEngine {
        fn reconstruct(&self, request: &ReconstructionRequest) -> Option<EngineMesh> {
            let released = self.released.clone();
            Some(
                EngineMesh::new(request.points().to_vec(), vec![[0, 1, 2]]).with_release(move || {
                    released.fetch_add(1, Ordering::SeqCst);
                }),
            )
        }
    }

    struct FailingEngine;

    impl ReconstructionEngine for FailingEngine {
        fn reconstruct(&self, _request: &ReconstructionRequest) -> Option<EngineMesh> {
            None
        }
    }

    struct SlowEngine {
        delay: Duration,
        released: Arc<AtomicUsize>,
    }

    impl ReconstructionEngine for SlowEngine {
        fn reconstruct(&self, _request: &ReconstructionRequest) -> Option<EngineMesh> {
            thread::sleep(self.delay);
            let released = self.released.clone();
            Some(EngineMesh::empty().with_release(move || {
                released.fetch_add(1, Ordering::SeqCst);
            }))
        }
    }

    struct PanickingEngine;

    impl ReconstructionEngine for PanickingEngine {
        fn reconstruct(&self, _request: &ReconstructionRequest) -> Option<EngineMesh> {
            panic!("engine crashed");
        }
    }

    #[test]
    fn test_submit_returns_engine_mesh() {
        let released = Arc::new(AtomicUsize::new(0));
        let engine = Arc::new(TriangleEngine { released: released.clone() });

        let mesh = build_and_submit(&cloud(), &engine, &SubmitOptions::default()).unwrap();
        assert_eq!(mesh.num_points(), 3);
        assert_eq!(mesh.polygons(), &[[0, 1, 2]]);
        assert_eq!(released.load(Ordering::SeqCst), 0);

        drop(mesh);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_engine_failure() {
        let engine = Arc::new(FailingEngine);
        let result = build_and_submit(&cloud(), &engine, &SubmitOptions::default());
        assert!(matches!(result, Err(ReconstructionError::EngineFailure)));
    }

    #[test]
    fn test_empty_cloud_never_reaches_engine() {
        let engine = Arc::new(PanickingEngine);
        let result = build_and_submit(&ScanCloud::new(), &engine, &SubmitOptions::default());
        assert!(matches!(result, Err(ReconstructionError::EmptyCloud)));
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let engine = Arc::new(PanickingEngine);
        let result = build_and_submit(&cloud(), &engine, &SubmitOptions::default());
        assert!(matches!(result, Err(ReconstructionError::WorkerLost)));
    }

    #[test]
    fn test_timeout_releases_late_mesh() {
        let released = Arc::new(AtomicUsize::new(0));
        let engine = Arc::new(SlowEngine {
            delay: Duration::from_millis(200),
            released: released.clone(),
        });
        let options = SubmitOptions::default().with_timeout(Duration::from_millis(10));

        let result = build_and_submit(&cloud(), &engine, &options);
        assert!(matches!(result, Err(ReconstructionError::Timeout(_))));

        let deadline = Instant::now() + Duration::from_secs(5);
        while released.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dyn_engine() {
        let engine: Arc<dyn ReconstructionEngine> = Arc::new(FailingEngine);
        let result = build_and_submit(&cloud(), &engine, &SubmitOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_options_builder() {
        let options = SubmitOptions::default()
            .with_timeout(Duration::from_secs(30))
            .with_unposed_frames(UnposedFramePolicy::Drop)
            .with_thread_name("recon");
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.unposed_frames, UnposedFramePolicy::Drop);
        assert_eq!(options.thread_name, "recon");
    }
}
