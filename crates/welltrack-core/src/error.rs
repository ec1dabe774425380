use thiserror::Error;

use crate::pipeline::AnalysisStage;

#[derive(Error, Debug)]
pub enum WelltrackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No frames supplied")]
    EmptyInput,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(
        "Well {well_id} (bbox {x},{y} {width}x{height}) exceeds frame dimensions {frame_width}x{frame_height}"
    )]
    RegionOutOfBounds {
        well_id: usize,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        frame_width: usize,
        frame_height: usize,
    },

    #[error(
        "{stage} failed ({}min area {min_area}): {source}",
        threshold_prefix(.threshold)
    )]
    Stage {
        stage: AnalysisStage,
        /// Threshold in effect, once one has been resolved.
        threshold: Option<f32>,
        min_area: usize,
        #[source]
        source: Box<WelltrackError>,
    },
}

impl WelltrackError {
    /// The innermost error, skipping any stage context wrappers.
    pub fn root_cause(&self) -> &WelltrackError {
        match self {
            Self::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Stage at which an analysis failed, if the error carries one.
    pub fn stage(&self) -> Option<AnalysisStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

fn threshold_prefix(threshold: &Option<f32>) -> String {
    threshold.map_or_else(String::new, |t| format!("threshold {t}, "))
}

pub type Result<T> = std::result::Result<T, WelltrackError>;
