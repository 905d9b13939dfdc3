//! Flattening a scan cloud into the buffers a reconstruction engine consumes

use crate::error::{ReconstructionError, Result};
use scancrate_core::{ScanCloud, Viewpoint};
use serde::{Deserialize, Serialize};

/// How frames captured without a camera pose enter a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnposedFramePolicy {
    /// Reuse the closest preceding viewpoint. Frames captured before the first
    /// posed frame use the first viewpoint that follows them.
    #[default]
    CarryForward,
    /// Leave the frame and its samples out of the request
    Drop,
}

/// Engine input: all samples concatenated in capture order, one size per frame
/// and exactly one viewpoint per frame.
///
/// The request owns its buffers, so they stay valid for as long as the engine
/// holds the request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionRequest {
    points: Vec<[f64; 3]>,
    frame_sizes: Vec<i32>,
    viewpoints: Vec<[f64; 3]>,
}

/// One frame of a request, borrowed from its flat buffers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestFrame<'a> {
    pub points: &'a [[f64; 3]],
    pub viewpoint: [f64; 3],
}

fn widen(p: &Viewpoint) -> [f64; 3] {
    [p.x as f64, p.y as f64, p.z as f64]
}

fn to_i32(what: &'static str, count: usize) -> Result<i32> {
    i32::try_from(count).map_err(|_| ReconstructionError::TooLarge { what, count })
}

impl ReconstructionRequest {
    /// Flatten `cloud`, resolving unposed frames with `policy`.
    ///
    /// Fails with [`ReconstructionError::EmptyCloud`] when there are no samples to
    /// send and with [`ReconstructionError::MissingViewpoints`] when no frame was
    /// captured with a pose.
    pub fn from_cloud(cloud: &ScanCloud, policy: UnposedFramePolicy) -> Result<Self> {
        if cloud.is_empty() {
            return Err(ReconstructionError::EmptyCloud);
        }
        let Some(first_viewpoint) = cloud.frame_viewpoints().first().copied() else {
            return Err(ReconstructionError::MissingViewpoints);
        };

        let mut points = Vec::with_capacity(cloud.len());
        let mut frame_sizes = Vec::with_capacity(cloud.frame_count());
        let mut viewpoints = Vec::with_capacity(cloud.frame_count());
        let mut last_viewpoint = first_viewpoint;

        for frame in cloud.frames() {
            let viewpoint = match (frame.viewpoint, policy) {
                (Some(viewpoint), _) => {
                    last_viewpoint = viewpoint;
                    viewpoint
                }
                (None, UnposedFramePolicy::CarryForward) => last_viewpoint,
                (None, UnposedFramePolicy::Drop) => {
                    log::debug!(
                        "dropping unposed frame {} ({} samples)",
                        frame.index,
                        frame.samples.len()
                    );
                    continue;
                }
            };

            points.extend(frame.samples.iter().map(widen));
            frame_sizes.push(to_i32("frame size", frame.samples.len())?);
            viewpoints.push(widen(&viewpoint));
        }

        if points.is_empty() {
            return Err(ReconstructionError::EmptyCloud);
        }
        to_i32("point count", points.len())?;
        to_i32("frame count", frame_sizes.len())?;

        Ok(Self {
            points,
            frame_sizes,
            viewpoints,
        })
    }

    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    pub fn frame_sizes(&self) -> &[i32] {
        &self.frame_sizes
    }

    pub fn viewpoints(&self) -> &[[f64; 3]] {
        &self.viewpoints
    }

    /// Number of points; fits in `i32` by construction
    pub fn num_points(&self) -> i32 {
        self.points.len() as i32
    }

    /// Number of frames; fits in `i32` by construction
    pub fn num_frames(&self) -> i32 {
        self.frame_sizes.len() as i32
    }

    /// Recover the per-frame structure from the flat buffers
    pub fn frames(&self) -> impl ExactSizeIterator<Item = RequestFrame<'_>> + '_ {
        let mut offset = 0;
        self.frame_sizes
            .iter()
            .zip(&self.viewpoints)
            .map(move |(&size, viewpoint)| {
                let size = size as usize;
                let frame = RequestFrame {
                    points: &self.points[offset..offset + size],
                    viewpoint: *viewpoint,
                };
                offset += size;
                frame
            })
    }
}
