//! Error types for scanning sessions

use scancrate_reconstruction::ReconstructionError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot reconstruct while capturing")]
    CaptureInProgress,

    #[error(transparent)]
    Reconstruction(#[from] ReconstructionError),
}
