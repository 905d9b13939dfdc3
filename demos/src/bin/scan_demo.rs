//! Scan a synthetic sphere and reconstruct its surface
//!
//! A simulated tracker orbits a sphere, reporting the samples visible from its
//! current position on every tick. After the requested number of ticks the
//! session reconstructs the surface with the Poisson engine.
//!
//! Run with `RUST_LOG=debug` to follow every capture tick.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scancrate_capture::{ExportTarget, ScanConfig, ScanSession, TickOutcome, TrackingFrame, TrackingSource};
use scancrate_core::{CameraPose, Drawable, Point3f, Sample, UnitQuaternion, Vector3f};
use scancrate_reconstruction::{PoissonEngine, PoissonEngineConfig, SubmitOptions, UnposedFramePolicy};
use scancrate_visualization::Scene;

#[derive(Parser, Debug)]
#[command(version, about = "Scan a synthetic sphere and reconstruct its surface")]
struct Cli {
    #[arg(long, default_value_t = 12, help = "capture ticks to run")]
    ticks: usize,
    #[arg(long, default_value_t = 400, help = "samples reported per tick")]
    samples: usize,
    #[arg(long, default_value_t = 0.5)]
    radius: f32,
    #[arg(long, default_value_t = 0.002, help = "sample noise amplitude")]
    noise: f32,
    #[arg(long, default_value_t = 0, help = "drop the pose every n-th tick (0 = never)")]
    unposed_every: usize,
    #[arg(long, help = "leave unposed frames out of the reconstruction")]
    drop_unposed: bool,
    #[arg(long, default_value_t = 3)]
    add_point_ratio: usize,
    #[arg(long, default_value_t = 5, help = "Poisson octree depth")]
    depth: usize,
    #[arg(long, help = "give up waiting for the engine after this many seconds")]
    timeout: Option<f64>,
    #[arg(long, help = "sleep one scanning interval between ticks")]
    realtime: bool,
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

/// Tracker that orbits a sphere centered at the origin
struct SphereSource {
    radius: f32,
    noise: f32,
    samples: usize,
    ticks_per_orbit: usize,
    unposed_every: usize,
    tick: usize,
    rng: StdRng,
}

impl SphereSource {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            radius: cli.radius,
            noise: cli.noise,
            samples: cli.samples,
            ticks_per_orbit: cli.ticks.max(1),
            unposed_every: cli.unposed_every,
            tick: 0,
            rng: StdRng::seed_from_u64(cli.seed),
        }
    }

    fn camera_position(&self) -> Vector3f {
        let angle = TAU * self.tick as f32 / self.ticks_per_orbit as f32;
        Vector3f::new(angle.cos(), 0.4, angle.sin()) * (self.radius * 4.0)
    }

    /// Random points on the half of the sphere facing `camera`
    fn visible_samples(&mut self, camera: &Vector3f) -> Vec<Sample> {
        let facing = camera.normalize();
        let mut samples = Vec::with_capacity(self.samples);
        while samples.len() < self.samples {
            let direction = Vector3f::new(
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
            );
            let norm = direction.norm();
            if norm < 1e-3 || norm > 1.0 {
                continue;
            }
            let direction = direction / norm;
            if direction.dot(&facing) <= 0.0 {
                continue;
            }
            let r = self.radius + self.rng.gen_range(-self.noise..=self.noise);
            samples.push(Point3f::from(direction * r));
        }
        samples
    }
}

impl TrackingSource for SphereSource {
    fn current_frame(&mut self) -> Option<TrackingFrame> {
        let camera = self.camera_position();
        self.tick += 1;

        let samples = self.visible_samples(&camera);
        let posed = self.unposed_every == 0 || self.tick % self.unposed_every != 0;
        let pose = posed.then(|| CameraPose::from_translation_rotation(camera, UnitQuaternion::identity()));
        Some(TrackingFrame::new(Some(samples), pose))
    }

    fn restart(&mut self) {
        self.tick = 0;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut submit = SubmitOptions::default();
    if cli.drop_unposed {
        submit = submit.with_unposed_frames(UnposedFramePolicy::Drop);
    }
    if let Some(seconds) = cli.timeout {
        submit = submit.with_timeout(Duration::from_secs_f64(seconds));
    }
    let config = ScanConfig::default()
        .with_add_point_ratio(cli.add_point_ratio)
        .with_submit_options(submit);

    let engine = Arc::new(PoissonEngine::new(PoissonEngineConfig::default().with_depth(cli.depth)));
    let mut session = ScanSession::new(SphereSource::from_cli(&cli), engine, Scene::new(), config);

    info!("starting scan: {} ticks of {} samples", cli.ticks, cli.samples);
    session.toggle_capture();
    for _ in 0..cli.ticks {
        if let TickOutcome::Captured { samples, posed, .. } = session.on_timer_tick() {
            info!("captured {} samples{}", samples, if posed { "" } else { " without pose" });
        }
        if cli.realtime {
            thread::sleep(session.config().scanning_interval);
        }
    }
    session.toggle_capture();

    let cloud = session.cloud();
    println!(
        "Captured {} samples in {} frames ({} with a viewpoint)",
        cloud.len(),
        cloud.frame_count(),
        cloud.frame_viewpoints().len()
    );

    let faces = session.reconstruct().context("surface reconstruction failed")?;
    let scene = session.view();
    if let Some(surface) = scene.surface() {
        let (min, max) = surface.bounding_box();
        println!(
            "Surface: {} vertices, {} faces, bounds [{:.3}, {:.3}, {:.3}] - [{:.3}, {:.3}, {:.3}]",
            surface.vertex_count(),
            faces,
            min.x,
            min.y,
            min.z,
            max.x,
            max.y,
            max.z
        );
    }
    println!("Markers shown: {}", scene.markers().len());
    for target in ExportTarget::ALL {
        println!("Export {} as {}", target, target.default_file_name());
    }

    Ok(())
}
