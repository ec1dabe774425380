use std::path::{Path, PathBuf};

use crate::error::{Result, WelltrackError};
use crate::frame::{ColorMode, Frame, MediaKind, SourceInfo};

use super::image_io::load_image;
use super::ser::SerReader;

/// An ordered, finite, randomly accessible sequence of grayscale frames.
///
/// The analysis engine only ever reads frames through this trait, so any
/// decoder can feed it. Implementations must be `Sync` because the projector
/// reads sampled frames from several threads at once, and `Send` so an opened
/// source can be handed to a worker thread for the whole run.
pub trait FrameSource: Send + Sync {
    /// Number of frames in the sequence.
    fn frame_count(&self) -> usize;

    /// `(height, width)` shared by every frame.
    fn dimensions(&self) -> (usize, usize);

    /// Read one frame. `index` must be below `frame_count()`.
    fn read_frame(&self, index: usize) -> Result<Frame>;

    fn media_kind(&self) -> MediaKind;

    /// Nominal frames per second, for time-axis labelling only.
    fn frame_rate(&self) -> Option<f64> {
        None
    }

    /// Human-readable name, usually the file name.
    fn name(&self) -> String;
}

impl FrameSource for SerReader {
    fn frame_count(&self) -> usize {
        SerReader::frame_count(self)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.header.height as usize, self.header.width as usize)
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        SerReader::read_frame(self, index)
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn frame_rate(&self) -> Option<f64> {
        SerReader::frame_rate(self)
    }

    fn name(&self) -> String {
        SerReader::name(self).to_string()
    }
}

/// A single still image presented as a one-frame source.
pub struct StillImage {
    frame: Frame,
    name: String,
}

impl StillImage {
    pub fn new(frame: Frame, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let frame = load_image(path)?;
        Ok(Self::new(frame, file_name(path)))
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl FrameSource for StillImage {
    fn frame_count(&self) -> usize {
        1
    }

    fn dimensions(&self) -> (usize, usize) {
        self.frame.data.dim()
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        if index != 0 {
            return Err(WelltrackError::FrameIndexOutOfRange { index, total: 1 });
        }
        Ok(self.frame.clone())
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::Image
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Frames already decoded into memory, e.g. by an external video decoder.
pub struct FrameSequence {
    frames: Vec<Frame>,
    frame_rate: Option<f64>,
    name: String,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>, name: impl Into<String>) -> Self {
        Self {
            frames,
            frame_rate: None,
            name: name.into(),
        }
    }

    pub fn with_frame_rate(mut self, fps: f64) -> Self {
        self.frame_rate = Some(fps);
        self
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl FrameSource for FrameSequence {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.frames.first().map(|f| f.data.dim()).unwrap_or((0, 0))
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        let frame = self
            .frames
            .get(index)
            .ok_or(WelltrackError::FrameIndexOutOfRange {
                index,
                total: self.frames.len(),
            })?;
        let mut frame = frame.clone();
        frame.metadata.frame_index = index;
        Ok(frame)
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Open a file as a frame source, choosing the decoder from its extension.
///
/// `.ser` files are read as video; anything else goes through the image loader.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
        Some(ext) if ext == "ser" => Ok(Box::new(SerReader::open(path)?)),
        _ => Ok(Box::new(StillImage::open(path)?)),
    }
}

/// Describe any source in the same shape as `SerReader::source_info`.
pub fn describe_source(source: &dyn FrameSource, path: &Path) -> SourceInfo {
    let (h, w) = source.dimensions();
    let bit_depth = if source.frame_count() > 0 {
        source
            .read_frame(0)
            .map(|f| f.original_bit_depth)
            .unwrap_or(8)
    } else {
        8
    };
    SourceInfo {
        filename: PathBuf::from(path),
        media_kind: source.media_kind(),
        total_frames: source.frame_count(),
        width: w as u32,
        height: h as u32,
        bit_depth,
        color_mode: ColorMode::Mono,
        frame_rate: source.frame_rate(),
        observer: None,
        telescope: None,
        instrument: None,
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
