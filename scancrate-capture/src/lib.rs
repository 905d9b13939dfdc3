//! # ScanCrate Capture
//!
//! Collects samples from a tracking subsystem into a [`ScanCloud`](scancrate_core::ScanCloud)
//! and drives a scanning session: capture ticks, reconstruction and reset.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use scancrate_capture::{RecordedSource, ScanConfig, ScanSession, TrackingFrame};
//! use scancrate_core::{CameraPose, Point3f};
//! use scancrate_reconstruction::PoissonEngine;
//! use scancrate_visualization::Scene;
//!
//! let source = RecordedSource::new(vec![Some(TrackingFrame::posed(
//!     vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)],
//!     CameraPose::identity(),
//! ))]);
//! let mut session = ScanSession::new(
//!     source,
//!     Arc::new(PoissonEngine::default()),
//!     Scene::new(),
//!     ScanConfig::default(),
//! );
//!
//! session.toggle_capture();
//! session.on_timer_tick();
//! session.toggle_capture();
//! assert_eq!(session.cloud().len(), 2);
//! assert!(session.can_reconstruct());
//! ```

pub mod tracking;
pub mod capture;
pub mod config;
pub mod export;
pub mod session;
pub mod error;

pub use tracking::*;
pub use capture::*;
pub use config::*;
pub use export::*;
pub use session::*;
pub use error::*;
