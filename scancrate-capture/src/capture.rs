//! Single scanning tick: pull a frame from the tracker into the scan cloud

use crate::tracking::TrackingSource;
use scancrate_core::{Sample, ScanCloud};
use std::iter::StepBy;
use std::slice;

/// Every k-th sample of the newest frame, in capture order
pub type DisplaySamples<'a> = StepBy<slice::Iter<'a, Sample>>;

/// Result of a tick that found tracking data
#[derive(Debug)]
pub struct CapturedFrame<'a> {
    /// Samples appended to the cloud, possibly zero
    pub sample_count: usize,
    /// Whether a viewpoint was recorded with the frame
    pub posed: bool,
    /// Subset of the frame to draw; borrowed from the cloud
    pub display: DisplaySamples<'a>,
}

/// Poll `source` once and append whatever it reports to `cloud`.
///
/// Returns `None` without touching the cloud when the tracker has no frame or
/// the frame carries no sample list. A frame with an empty sample list is
/// recorded as a zero-length frame. An `add_point_ratio` of zero is treated as one.
pub fn capture_step<'a, S>(
    source: &mut S,
    cloud: &'a mut ScanCloud,
    add_point_ratio: usize,
) -> Option<CapturedFrame<'a>>
where
    S: TrackingSource + ?Sized,
{
    let frame = source.current_frame()?;
    let samples = frame.raw_samples?;
    let viewpoint = frame.camera_pose.map(|pose| pose.viewpoint());

    let sample_count = cloud.append(samples, viewpoint);
    log::debug!(
        "captured frame {} with {} samples{}",
        cloud.frame_count() - 1,
        sample_count,
        if viewpoint.is_some() { "" } else { " (no pose)" }
    );

    let cloud: &'a ScanCloud = cloud;
    Some(CapturedFrame {
        sample_count,
        posed: viewpoint.is_some(),
        display: cloud.last_frame_samples().iter().step_by(add_point_ratio.max(1)),
    })
}
