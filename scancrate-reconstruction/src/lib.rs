//! # ScanCrate Reconstruction
//!
//! Turns an accumulated scan into a reconstruction request, runs it through a
//! [`ReconstructionEngine`] on a background thread and hands the resulting
//! [`EngineMesh`] back to the caller.
//!
//! The engine is pluggable; [`PoissonEngine`] filters every frame, orients
//! normals toward the frame's camera and runs screened Poisson reconstruction.

pub mod error;
pub mod request;
pub mod engine;
pub mod submit;
pub mod poisson;

// Re-export commonly used items
pub use error::*;
pub use request::*;
pub use engine::*;
pub use submit::*;
pub use poisson::*;
