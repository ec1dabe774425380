use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single grayscale frame.
/// Pixel values are f32 in the source's native units, `[0, max_value()]`.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Original bit depth of the samples (8 or 16)
    pub original_bit_depth: u8,
    /// Per-frame metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
            metadata: FrameMetadata::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Largest representable intensity for this frame's bit depth.
    pub fn max_value(&self) -> f32 {
        max_value_for_depth(self.original_bit_depth)
    }
}

pub fn max_value_for_depth(bit_depth: u8) -> f32 {
    let bits = bit_depth.clamp(1, 16) as u32;
    ((1u32 << bits) - 1) as f32
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
}

/// Whether a source is a single still or a frame sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Color/Bayer mode of SER source data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColorMode {
    Mono,
    BayerRGGB,
    BayerGRBG,
    BayerGBRG,
    BayerBGGR,
    RGB,
    BGR,
}

/// Metadata about the source file.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub filename: PathBuf,
    pub media_kind: MediaKind,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_mode: ColorMode,
    pub frame_rate: Option<f64>,
    pub observer: Option<String>,
    pub telescope: Option<String>,
    pub instrument: Option<String>,
}

impl SourceInfo {
    /// Duration in seconds, when the frame rate is known.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.frame_rate
            .filter(|fps| *fps > 0.0)
            .map(|fps| self.total_frames as f64 / fps)
    }
}
