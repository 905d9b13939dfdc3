//! Error types for reconstruction requests

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while building or submitting a reconstruction request
#[derive(Error, Debug)]
pub enum ReconstructionError {
    #[error("Reconstruction engine returned no mesh")]
    EngineFailure,

    #[error("Point cloud is empty")]
    EmptyCloud,

    #[error("No captured frame has a camera viewpoint")]
    MissingViewpoints,

    #[error("{what} ({count}) exceeds the engine's 32-bit limit")]
    TooLarge { what: &'static str, count: usize },

    #[error("Reconstruction did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Reconstruction worker exited without a result")]
    WorkerLost,

    #[error("Failed to start reconstruction worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result type alias for reconstruction operations
pub type Result<T> = std::result::Result<T, ReconstructionError>;
