//! Tracking subsystem contract

use scancrate_core::{CameraPose, Sample};
use std::collections::VecDeque;

/// What the tracker reports for its current frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackingFrame {
    /// Raw feature samples in world space, `None` when the tracker has none yet
    pub raw_samples: Option<Vec<Sample>>,
    /// Camera-to-world transform, `None` when tracking is not established
    pub camera_pose: Option<CameraPose>,
}

impl TrackingFrame {
    pub fn new(raw_samples: Option<Vec<Sample>>, camera_pose: Option<CameraPose>) -> Self {
        Self {
            raw_samples,
            camera_pose,
        }
    }

    /// Frame with samples and a pose
    pub fn posed(samples: Vec<Sample>, pose: CameraPose) -> Self {
        Self::new(Some(samples), Some(pose))
    }
}

/// Source of tracking frames, polled once per scanning tick.
///
/// Returning `None` is a normal outcome meaning nothing is available right now.
pub trait TrackingSource {
    fn current_frame(&mut self) -> Option<TrackingFrame>;

    /// Restart tracking from scratch, discarding anchors and pose history
    fn restart(&mut self) {}
}

impl<T: TrackingSource + ?Sized> TrackingSource for Box<T> {
    fn current_frame(&mut self) -> Option<TrackingFrame> {
        (**self).current_frame()
    }

    fn restart(&mut self) {
        (**self).restart()
    }
}

/// Plays back a fixed sequence of polling results, then reports no data
#[derive(Debug, Clone, Default)]
pub struct RecordedSource {
    pending: VecDeque<Option<TrackingFrame>>,
    restarts: usize,
}

impl RecordedSource {
    pub fn new<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Option<TrackingFrame>>,
    {
        Self {
            pending: frames.into_iter().collect(),
            restarts: 0,
        }
    }

    /// Queue another polling result
    pub fn push(&mut self, frame: Option<TrackingFrame>) {
        self.pending.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// How many times tracking was restarted
    pub fn restarts(&self) -> usize {
        self.restarts
    }
}

impl TrackingSource for RecordedSource {
    fn current_frame(&mut self) -> Option<TrackingFrame> {
        self.pending.pop_front().flatten()
    }

    fn restart(&mut self) {
        self.restarts += 1;
    }
}
