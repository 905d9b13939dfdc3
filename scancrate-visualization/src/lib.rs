//! Visualization side of the scanning pipeline
//!
//! This crate turns reconstructed meshes into renderable geometry and defines
//! what the scanning session expects from a display:
//! - [`translate`] copies an engine mesh into a [`RenderableSurface`]
//! - [`ScanView`] is the display contract
//! - [`Scene`] is an in-memory display that records markers, surface and notices

pub mod surface;
pub mod view;
pub mod scene;

pub use surface::*;
pub use view::*;
pub use scene::*;
