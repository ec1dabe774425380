use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::detection::{WellId, WellRegion};
use crate::error::{Result, WelltrackError};
use crate::frame::Frame;

/// Brightness measure taken for each well in each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Arithmetic mean of the pixels under the well mask.
    #[default]
    Average,
    /// Brightest pixel under the mask, with its location.
    Peak,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Average, Metric::Peak];

    /// The metric not selected.
    pub fn other(self) -> Metric {
        match self {
            Self::Average => Self::Peak,
            Self::Peak => Self::Average,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Average => write!(f, "average"),
            Self::Peak => write!(f, "peak"),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = WelltrackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "average" | "mean" => Ok(Self::Average),
            "peak" | "max" => Ok(Self::Peak),
            other => Err(WelltrackError::InvalidConfiguration(format!(
                "unsupported metric '{other}' (expected 'average' or 'peak')"
            ))),
        }
    }
}

/// One well's measurement in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub frame_index: usize,
    pub value: f64,
    /// `(x, y)` of the brightest pixel; only set for `Metric::Peak`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_coordinate: Option<(usize, usize)>,
}

/// Check once that every region fits inside a `width` x `height` frame.
pub fn validate_regions(regions: &[WellRegion], width: usize, height: usize) -> Result<()> {
    match regions.iter().find(|r| !r.bbox.fits_within(width, height)) {
        Some(r) => Err(WelltrackError::RegionOutOfBounds {
            well_id: r.id,
            x: r.bbox.x,
            y: r.bbox.y,
            width: r.bbox.width,
            height: r.bbox.height,
            frame_width: width,
            frame_height: height,
        }),
        None => Ok(()),
    }
}

/// Measure every well in one frame.
///
/// Validates the regions against the frame first; callers measuring many
/// frames should validate once and use `extract_validated`.
pub fn extract(
    frame: &Frame,
    regions: &[WellRegion],
    metric: Metric,
) -> Result<BTreeMap<WellId, MetricSample>> {
    validate_regions(regions, frame.width(), frame.height())?;
    Ok(extract_validated(frame, regions, metric).into_iter().collect())
}

/// Measure every well in one frame, assuming the regions were validated
/// against frames of this size. Samples come back in region order.
pub fn extract_validated(
    frame: &Frame,
    regions: &[WellRegion],
    metric: Metric,
) -> Vec<(WellId, MetricSample)> {
    let measure = |region: &WellRegion| (region.id, measure_region(frame, region, metric));
    if frame.data.len() >= PARALLEL_PIXEL_THRESHOLD && regions.len() > 1 {
        regions.par_iter().map(measure).collect()
    } else {
        regions.iter().map(measure).collect()
    }
}

/// Measure a single well. The region must lie inside the frame.
pub fn measure_region(frame: &Frame, region: &WellRegion, metric: Metric) -> MetricSample {
    let frame_index = frame.metadata.frame_index;
    match metric {
        Metric::Average => {
            let sum: f64 = region
                .pixels()
                .map(|(x, y)| frame.data[[y, x]] as f64)
                .sum();
            MetricSample {
                frame_index,
                value: if region.area > 0 { sum / region.area as f64 } else { 0.0 },
                peak_coordinate: None,
            }
        }
        Metric::Peak => {
            // Row-major scan with strict `>` keeps the first maximum.
            let mut best: Option<(f32, (usize, usize))> = None;
            for (x, y) in region.pixels() {
                let v = frame.data[[y, x]];
                let brighter = match best {
                    None => true,
                    Some((b, _)) => v > b,
                };
                if brighter {
                    best = Some((v, (x, y)));
                }
            }
            MetricSample {
                frame_index,
                value: best.map_or(0.0, |(v, _)| v as f64),
                peak_coordinate: best.map(|(_, xy)| xy),
            }
        }
    }
}
