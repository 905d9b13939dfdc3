//! Scanning session configuration

use scancrate_reconstruction::SubmitOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration parameters for a scanning session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Period of the capture timer (default: 0.5s)
    pub scanning_interval: Duration,
    /// Show one out of this many captured samples (default: 3)
    pub add_point_ratio: usize,
    /// How reconstructions are submitted
    pub submit: SubmitOptions,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scanning_interval: Duration::from_millis(500),
            add_point_ratio: 3,
            submit: SubmitOptions::default(),
        }
    }
}

impl ScanConfig {
    pub fn with_scanning_interval(mut self, interval: Duration) -> Self {
        self.scanning_interval = interval;
        self
    }

    pub fn with_add_point_ratio(mut self, ratio: usize) -> Self {
        self.add_point_ratio = ratio;
        self
    }

    pub fn with_submit_options(mut self, submit: SubmitOptions) -> Self {
        self.submit = submit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scancrate_reconstruction::UnposedFramePolicy;

    #[test]
    fn test_scan_config_default() {
        let config = ScanConfig::default();
        assert_eq!(config.scanning_interval, Duration::from_secs_f64(0.5));
        assert_eq!(config.add_point_ratio, 3);
        assert_eq!(config.submit.timeout, None);
    }

    #[test]
    fn test_scan_config_builder() {
        let config = ScanConfig::default()
            .with_scanning_interval(Duration::from_millis(100))
            .with_add_point_ratio(1)
            .with_submit_options(SubmitOptions::default().with_unposed_frames(UnposedFramePolicy::Drop));
        assert_eq!(config.scanning_interval, Duration::from_millis(100));
        assert_eq!(config.add_point_ratio, 1);
        assert_eq!(config.submit.unposed_frames, UnposedFramePolicy::Drop);
    }
}
