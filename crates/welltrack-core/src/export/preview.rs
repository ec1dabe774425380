use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tracing::info;

use crate::consts::{WELL_OUTLINE_RGB, WELL_OUTLINE_THICKNESS};
use crate::detection::{BoundingBox, WellRegion};
use crate::error::{Result, WelltrackError};
use crate::frame::Frame;
use crate::io::image_io::{frame_to_rgb, save_rgb_png};
use crate::io::source::FrameSource;
use crate::result::AnalysisResult;

/// Render `frame` to RGB with every well's bounding box outlined.
pub fn draw_well_map(frame: &Frame, wells: &[WellRegion]) -> RgbImage {
    let mut img = frame_to_rgb(frame);
    for well in wells {
        draw_box(&mut img, &well.bbox);
    }
    img
}

/// Save the detection image with well outlines as PNG.
pub fn save_well_map(result: &AnalysisResult, path: &Path) -> Result<()> {
    let projection = result.projection().ok_or_else(|| {
        WelltrackError::InvalidConfiguration("result carries no detection image".into())
    })?;
    save_rgb_png(&draw_well_map(projection, result.wells()), path)
}

/// Re-read each well's peak frame from `source` and save it with that
/// well outlined, as `<prefix>_well_<n>_frame_<f>.png` in `dir`.
pub fn save_peak_snapshots(
    result: &AnalysisResult,
    source: &dyn FrameSource,
    dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(result.peaks().len());
    for (&id, peak) in result.peaks() {
        let Some(well) = result.well(id) else {
            continue;
        };
        let frame = source.read_frame(peak.frame_index)?;
        let mut img = frame_to_rgb(&frame);
        draw_box(&mut img, &well.bbox);
        let path = dir.join(format!(
            "{prefix}_well_{}_frame_{}.png",
            id + 1,
            peak.frame_index
        ));
        save_rgb_png(&img, &path)?;
        written.push(path);
    }
    info!(snapshots = written.len(), dir = %dir.display(), "Peak snapshots saved");
    Ok(written)
}

fn draw_box(img: &mut RgbImage, bbox: &BoundingBox) {
    let (w, h) = (img.width() as usize, img.height() as usize);
    if w == 0 || h == 0 {
        return;
    }
    let color = Rgb(WELL_OUTLINE_RGB);
    let right = bbox.right().min(w);
    let bottom = bbox.bottom().min(h);
    for t in 0..WELL_OUTLINE_THICKNESS {
        let top = bbox.y + t;
        let low = bottom.saturating_sub(1 + t);
        let left = bbox.x + t;
        let rgt = right.saturating_sub(1 + t);
        if top > low || left > rgt {
            break;
        }
        for x in left..=rgt {
            img.put_pixel(x as u32, top as u32, color);
            img.put_pixel(x as u32, low as u32, color);
        }
        for y in top..=low {
            img.put_pixel(left as u32, y as u32, color);
            img.put_pixel(rgt as u32, y as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_box_outline_is_green_inside_gray() {
        let frame = Frame::new(Array2::from_elem((10, 10), 100.0), 8);
        let well = WellRegion {
            id: 0,
            bbox: BoundingBox {
                x: 2,
                y: 2,
                width: 6,
                height: 6,
            },
            mask: Array2::from_elem((6, 6), true),
            centroid: (4.5, 4.5),
            area: 36,
        };
        let img = draw_well_map(&frame, &[well]);
        assert_eq!(img.get_pixel(2, 2).0, WELL_OUTLINE_RGB);
        assert_eq!(img.get_pixel(7, 5).0, WELL_OUTLINE_RGB);
        assert_eq!(img.get_pixel(3, 3).0, WELL_OUTLINE_RGB);
        assert_eq!(img.get_pixel(4, 4).0, [100, 100, 100]);
        assert_eq!(img.get_pixel(0, 0).0, [100, 100, 100]);
    }
}
