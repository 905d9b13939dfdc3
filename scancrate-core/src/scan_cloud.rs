//! Frame-structured point cloud accumulated during a scanning session

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Samples accumulated across capture ticks, with the frame boundaries and
/// camera viewpoints needed to reconstruct a surface from them.
///
/// Invariants maintained by [`ScanCloud::append`]:
/// * `frame_sizes().iter().sum() == points().len()`
/// * `frame_viewpoints().len() <= frame_sizes().len()`, with equality when every
///   frame was captured with a camera pose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScanCloudData")]
pub struct ScanCloud {
    points: Vec<Sample>,
    frame_sizes: Vec<usize>,
    frame_viewpoints: Vec<Viewpoint>,
    /// Frame index each entry of `frame_viewpoints` was captured with
    viewpoint_frames: Vec<usize>,
}

/// Unchecked wire form of a [`ScanCloud`]
#[derive(Deserialize)]
struct ScanCloudData {
    points: Vec<Sample>,
    frame_sizes: Vec<usize>,
    frame_viewpoints: Vec<Viewpoint>,
    viewpoint_frames: Vec<usize>,
}

impl TryFrom<ScanCloudData> for ScanCloud {
    type Error = Error;

    fn try_from(data: ScanCloudData) -> Result<Self> {
        let total = data
            .frame_sizes
            .iter()
            .try_fold(0usize, |sum, &size| sum.checked_add(size))
            .ok_or_else(|| Error::InvalidData("frame sizes overflow".to_string()))?;
        if total != data.points.len() {
            return Err(Error::InvalidData(format!(
                "frame sizes add up to {} but the cloud has {} points",
                total,
                data.points.len()
            )));
        }
        if data.viewpoint_frames.len() != data.frame_viewpoints.len() {
            return Err(Error::InvalidData(format!(
                "{} viewpoints but {} viewpoint frame indices",
                data.frame_viewpoints.len(),
                data.viewpoint_frames.len()
            )));
        }
        let ascending = data.viewpoint_frames.windows(2).all(|w| w[0] < w[1]);
        let in_range = data
            .viewpoint_frames
            .last()
            .map_or(true, |&last| last < data.frame_sizes.len());
        if !ascending || !in_range {
            return Err(Error::InvalidData(
                "viewpoint frame indices must be strictly ascending frame indices".to_string(),
            ));
        }

        Ok(Self {
            points: data.points,
            frame_sizes: data.frame_sizes,
            frame_viewpoints: data.frame_viewpoints,
            viewpoint_frames: data.viewpoint_frames,
        })
    }
}

/// One captured frame, borrowed from a [`ScanCloud`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    pub index: usize,
    pub samples: &'a [Sample],
    pub viewpoint: Option<Viewpoint>,
}

impl ScanCloud {
    /// Create a new empty scan cloud
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one frame of samples.
    ///
    /// A frame is recorded even when `samples` is empty. Sample values are not
    /// validated; non-finite coordinates are stored as given.
    pub fn append<I>(&mut self, samples: I, viewpoint: Option<Viewpoint>) -> usize
    where
        I: IntoIterator<Item = Sample>,
    {
        let start = self.points.len();
        self.points.extend(samples);
        let appended = self.points.len() - start;

        let frame_index = self.frame_sizes.len();
        self.frame_sizes.push(appended);
        if let Some(viewpoint) = viewpoint {
            self.frame_viewpoints.push(viewpoint);
            self.viewpoint_frames.push(frame_index);
        }
        appended
    }

    /// Remove every frame, sample and viewpoint
    pub fn clear(&mut self) {
        self.points.clear();
        self.frame_sizes.clear();
        self.frame_viewpoints.clear();
        self.viewpoint_frames.clear();
    }

    /// Whether any sample has been captured.
    ///
    /// Frames without samples do not count.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the number of samples in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Get the number of captured frames
    pub fn frame_count(&self) -> usize {
        self.frame_sizes.len()
    }

    pub fn points(&self) -> &[Sample] {
        &self.points
    }

    pub fn frame_sizes(&self) -> &[usize] {
        &self.frame_sizes
    }

    pub fn frame_viewpoints(&self) -> &[Viewpoint] {
        &self.frame_viewpoints
    }

    /// Samples of the most recently appended frame
    pub fn last_frame_samples(&self) -> &[Sample] {
        let size = self.frame_sizes.last().copied().unwrap_or(0);
        &self.points[self.points.len() - size..]
    }

    /// Viewpoint captured with frame `index`, if that frame had a pose
    pub fn viewpoint_of(&self, index: usize) -> Option<Viewpoint> {
        self.viewpoint_frames
            .binary_search(&index)
            .ok()
            .map(|slot| self.frame_viewpoints[slot])
    }

    /// Iterate over frames in capture order
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            cloud: self,
            frame: 0,
            offset: 0,
            viewpoint_slot: 0,
        }
    }
}

/// Iterator over the frames of a [`ScanCloud`]
pub struct Frames<'a> {
    cloud: &'a ScanCloud,
    frame: usize,
    offset: usize,
    viewpoint_slot: usize,
}

impl<'a> Iterator for Frames<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let cloud = self.cloud;
        let size = *cloud.frame_sizes.get(self.frame)?;
        let samples = &cloud.points[self.offset..self.offset + size];

        let viewpoint = match cloud.viewpoint_frames.get(self.viewpoint_slot) {
            Some(&owner) if owner == self.frame => {
                let viewpoint = cloud.frame_viewpoints[self.viewpoint_slot];
                self.viewpoint_slot += 1;
                Some(viewpoint)
            }
            _ => None,
        };

        let frame = Frame {
            index: self.frame,
            samples,
            viewpoint,
        };
        self.frame += 1;
        self.offset += size;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cloud.frame_sizes.len() - self.frame;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

impl Index<usize> for ScanCloud {
    type Output = Sample;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a ScanCloud {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(n: usize, base: f32) -> Vec<Sample> {
        (0..n).map(|i| Point3f::new(base + i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_append_tracks_frames() {
        let mut cloud = ScanCloud::new();
        cloud.append(samples(5, 0.0), Some(Point3f::new(0.0, 0.0, 1.0)));
        cloud.append(Vec::new(), None);
        cloud.append(samples(7, 100.0), Some(Point3f::new(0.0, 0.0, 2.0)));

        assert_eq!(cloud.len(), 12);
        assert_eq!(cloud.frame_sizes(), &[5, 0, 7]);
        assert_eq!(cloud.frame_viewpoints().len(), 2);
        assert_eq!(cloud.frame_sizes().iter().sum::<usize>(), cloud.len());
    }

    #[test]
    fn test_empty_frame_is_still_empty_cloud() {
        let mut cloud = ScanCloud::new();
        cloud.append(Vec::new(), Some(Point3f::origin()));
        assert!(cloud.is_empty());
        assert_eq!(cloud.frame_count(), 1);
    }

    #[test]
    fn test_non_finite_samples_are_kept() {
        let mut cloud = ScanCloud::new();
        cloud.append(vec![Point3f::new(f32::NAN, f32::INFINITY, 0.0)], None);
        assert_eq!(cloud.len(), 1);
        assert!(cloud[0].x.is_nan());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cloud = ScanCloud::new();
        cloud.append(samples(3, 0.0), Some(Point3f::origin()));

        cloud.clear();
        let once = cloud.clone();
        cloud.clear();

        assert_eq!(cloud, once);
        assert_eq!(cloud, ScanCloud::new());
        assert!(cloud.is_empty());
    }

    #[test]
    fn test_frames_pair_viewpoints_with_their_frame() {
        let mut cloud = ScanCloud::new();
        let v0 = Point3f::new(1.0, 0.0, 0.0);
        let v2 = Point3f::new(3.0, 0.0, 0.0);
        cloud.append(samples(2, 0.0), Some(v0));
        cloud.append(samples(1, 10.0), None);
        cloud.append(samples(3, 20.0), Some(v2));

        let frames: Vec<_> = cloud.frames().collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].viewpoint, Some(v0));
        assert_eq!(frames[1].viewpoint, None);
        assert_eq!(frames[1].samples, &[Point3f::new(10.0, 0.0, 0.0)]);
        assert_eq!(frames[2].viewpoint, Some(v2));
        assert_eq!(frames[2].samples.len(), 3);

        assert_eq!(cloud.viewpoint_of(1), None);
        assert_eq!(cloud.viewpoint_of(2), Some(v2));
    }

    #[test]
    fn test_last_frame_samples() {
        let mut cloud = ScanCloud::new();
        assert!(cloud.last_frame_samples().is_empty());
        cloud.append(samples(2, 0.0), None);
        cloud.append(samples(3, 10.0), None);
        assert_eq!(cloud.last_frame_samples(), &samples(3, 10.0)[..]);
    }

    fn posed_cloud() -> ScanCloud {
        let mut cloud = ScanCloud::new();
        cloud.append(samples(2, 0.0), Some(Point3f::new(0.0, 0.0, 1.0)));
        cloud.append(samples(1, 10.0), None);
        cloud.append(samples(3, 20.0), Some(Point3f::new(0.0, 0.0, 2.0)));
        cloud
    }

    #[test]
    fn test_serde_round_trip() {
        let cloud = posed_cloud();
        let json = serde_json::to_string(&cloud).unwrap();
        let restored: ScanCloud = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cloud);
        assert_eq!(restored.viewpoint_of(2), Some(Point3f::new(0.0, 0.0, 2.0)));
    }

    #[test]
    fn test_deserialize_rejects_frame_sizes_beyond_points() {
        let json = r#"{"points":[],"frame_sizes":[5],"frame_viewpoints":[],"viewpoint_frames":[]}"#;
        assert!(serde_json::from_str::<ScanCloud>(json).is_err());

        let json = r#"{"points":[[0.0,0.0,0.0]],"frame_sizes":[3],"frame_viewpoints":[],"viewpoint_frames":[]}"#;
        assert!(serde_json::from_str::<ScanCloud>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_bad_viewpoint_frames() {
        let mut value = serde_json::to_value(posed_cloud()).unwrap();

        value["viewpoint_frames"] = serde_json::json!([0, 3]);
        assert!(serde_json::from_value::<ScanCloud>(value.clone()).is_err());

        value["viewpoint_frames"] = serde_json::json!([2, 0]);
        assert!(serde_json::from_value::<ScanCloud>(value.clone()).is_err());

        value["viewpoint_frames"] = serde_json::json!([0]);
        assert!(serde_json::from_value::<ScanCloud>(value).is_err());
    }
}
