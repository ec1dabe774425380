use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SAMPLE_RATE;
use crate::detection::DetectionConfig;
use crate::error::{Result, WelltrackError};
use crate::metrics::Metric;

/// Everything an analysis run needs besides the frames themselves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub metric: Metric,
    /// Analyse every Nth frame of a video. Ignored for still images.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: usize,
}

fn default_sample_rate() -> usize {
    DEFAULT_SAMPLE_RATE
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            metric: Metric::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(WelltrackError::InvalidConfiguration(
                "sample_rate must be a positive integer".into(),
            ));
        }
        self.detection.validate()
    }
}
