use ndarray::Zip;
use rayon::prelude::*;
use tracing::info;

use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::{Result, WelltrackError};
use crate::frame::{Frame, MediaKind};
use crate::io::source::FrameSource;

/// Indices visited with a stride of `sample_rate`: 0, N, 2N, ... below `frame_count`.
pub fn sampled_indices(frame_count: usize, sample_rate: usize) -> impl Iterator<Item = usize> {
    (0..frame_count).step_by(sample_rate.max(1))
}

/// Number of frames visited with a given stride: ceil(F / N).
pub fn sampled_count(frame_count: usize, sample_rate: usize) -> usize {
    frame_count.div_ceil(sample_rate.max(1))
}

/// Reduce a source to one representative image.
///
/// Videos yield the per-pixel maximum over every sampled frame, so wells that
/// light up at different times all show in one image. A still image is
/// returned unchanged and the stride is ignored.
pub fn project(source: &dyn FrameSource, sample_rate: usize) -> Result<Frame> {
    if sample_rate == 0 {
        return Err(WelltrackError::InvalidConfiguration(
            "sample_rate must be a positive integer".into(),
        ));
    }
    let total = source.frame_count();
    if total == 0 {
        return Err(WelltrackError::EmptyInput);
    }
    if source.media_kind() == MediaKind::Image || total == 1 {
        return source.read_frame(0);
    }

    let indices: Vec<usize> = sampled_indices(total, sample_rate).collect();
    let projected = if indices.len() >= PARALLEL_FRAME_THRESHOLD {
        indices
            .par_iter()
            .map(|&i| source.read_frame(i))
            .try_reduce_with(max_merge)
            .ok_or(WelltrackError::EmptyInput)??
    } else {
        let mut frames = indices.iter().map(|&i| source.read_frame(i));
        let first = frames.next().ok_or(WelltrackError::EmptyInput)??;
        frames.try_fold(first, |acc, frame| max_merge(acc, frame?))?
    };

    info!(
        frames = indices.len(),
        total,
        sample_rate,
        "Maximum-intensity projection complete"
    );
    Ok(projected)
}

/// Per-pixel maximum of two frames, keeping the first frame's metadata.
fn max_merge(mut acc: Frame, frame: Frame) -> Result<Frame> {
    if acc.data.dim() != frame.data.dim() {
        return Err(WelltrackError::InvalidDimensions {
            width: frame.width() as u32,
            height: frame.height() as u32,
        });
    }
    Zip::from(&mut acc.data)
        .and(&frame.data)
        .for_each(|a, &b| *a = a.max(b));
    acc.original_bit_depth = acc.original_bit_depth.max(frame.original_bit_depth);
    acc.metadata.frame_index = acc.metadata.frame_index.min(frame.metadata.frame_index);
    Ok(acc)
}

/// Describe how the detection image was formed, for run metadata.
pub fn projection_description(source: &dyn FrameSource, sample_rate: usize) -> String {
    let total = source.frame_count();
    if source.media_kind() == MediaKind::Image || total <= 1 {
        "single image".to_string()
    } else {
        format!(
            "max-intensity projection over {} frames",
            sampled_count(total, sample_rate)
        )
    }
}
