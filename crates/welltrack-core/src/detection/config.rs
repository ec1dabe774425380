use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BACKGROUND_LEVEL, DEFAULT_MIN_WELL_AREA, DEFAULT_OPENING_ITERATIONS, DEFAULT_THRESHOLD,
};
use crate::error::{Result, WelltrackError};

/// Method used to separate lit wells from the plate background.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ThresholdMethod {
    /// Fixed threshold in the frame's intensity units. Clamped to the valid range.
    Fixed(f32),
    /// Otsu's method: minimizes intra-class variance on a bimodal histogram.
    Otsu,
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::Fixed(DEFAULT_THRESHOLD)
    }
}

impl std::fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(v) => write!(f, "Fixed ({v})"),
            Self::Otsu => write!(f, "Otsu"),
        }
    }
}

/// Pixel adjacency used when grouping foreground pixels into wells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// Horizontal and vertical neighbours only.
    Four,
    /// Diagonal neighbours too.
    #[default]
    Eight,
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Four => write!(f, "4-connected"),
            Self::Eight => write!(f, "8-connected"),
        }
    }
}

/// Configuration for well detection on the projected image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Thresholding method.
    #[serde(default)]
    pub threshold_method: ThresholdMethod,
    /// Minimum connected component area (pixels) to count as a well.
    #[serde(default = "default_min_area")]
    pub min_area: usize,
    /// Constant subtracted from every pixel before thresholding.
    #[serde(default = "default_background_level")]
    pub background_level: f32,
    /// Number of 3x3 erosion/dilation passes used to split touching wells.
    #[serde(default = "default_opening_iterations")]
    pub opening_iterations: usize,
    #[serde(default)]
    pub connectivity: Connectivity,
}

fn default_min_area() -> usize {
    DEFAULT_MIN_WELL_AREA
}
fn default_background_level() -> f32 {
    DEFAULT_BACKGROUND_LEVEL
}
fn default_opening_iterations() -> usize {
    DEFAULT_OPENING_ITERATIONS
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold_method: ThresholdMethod::default(),
            min_area: DEFAULT_MIN_WELL_AREA,
            background_level: DEFAULT_BACKGROUND_LEVEL,
            opening_iterations: DEFAULT_OPENING_ITERATIONS,
            connectivity: Connectivity::default(),
        }
    }
}

impl DetectionConfig {
    /// Reject settings that can never produce a meaningful segmentation.
    pub fn validate(&self) -> Result<()> {
        if self.min_area == 0 {
            return Err(WelltrackError::InvalidConfiguration(
                "min_area must be a positive pixel count".into(),
            ));
        }
        if !self.background_level.is_finite() || self.background_level < 0.0 {
            return Err(WelltrackError::InvalidConfiguration(format!(
                "background_level must be a non-negative number, got {}",
                self.background_level
            )));
        }
        if let ThresholdMethod::Fixed(v) = self.threshold_method {
            if v.is_nan() {
                return Err(WelltrackError::InvalidConfiguration(
                    "fixed threshold is NaN".into(),
                ));
            }
        }
        Ok(())
    }
}
