use ndarray::{s, Array2};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::frame::Frame;

use super::components::{connected_components, ComponentStats};
use super::config::DetectionConfig;
use super::morphology::morphological_opening;
use super::region::{BoundingBox, WellRegion};
use super::threshold::{binarize, compute_mean_stddev, compute_threshold, subtract_background};

/// Output of well detection on one representative image.
#[derive(Clone, Debug)]
pub struct WellDetection {
    /// Wells in reading order; `regions[i].id == i`.
    pub regions: Vec<WellRegion>,
    /// Threshold actually applied, after clamping or Otsu resolution.
    pub threshold: f32,
    /// Parameters the detection ran with.
    pub config: DetectionConfig,
    /// `(height, width)` of the image the wells were found in.
    pub dimensions: (usize, usize),
}

impl WellDetection {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Segment an image into wells.
///
/// Pipeline: background subtraction -> threshold -> optional opening ->
/// connected components -> area filter -> reading-order ids.
///
/// Finding no wells is not an error: the detection comes back empty and a
/// warning is logged.
pub fn detect_wells(image: &Frame, config: &DetectionConfig) -> Result<WellDetection> {
    config.validate()?;
    let data = &image.data;
    let (h, w) = data.dim();

    // Step 1: background subtraction.
    let corrected = subtract_background(data, config.background_level);

    // Step 2: threshold.
    let threshold = compute_threshold(&corrected, &config.threshold_method, image.max_value());
    let (mean, stddev) = compute_mean_stddev(&corrected);
    debug!(mean, stddev, threshold, method = %config.threshold_method, "Detection image statistics");
    let mask = binarize(&corrected, threshold);

    // Step 3: optional opening to separate touching wells.
    let mask = morphological_opening(&mask, config.opening_iterations);

    // Step 4: connected components.
    let labeling = connected_components(&mask, config.connectivity);
    let candidates = labeling.components.len();

    // Step 5: area filter.
    let mut survivors: Vec<&ComponentStats> = labeling
        .components
        .iter()
        .filter(|c| c.area >= config.min_area)
        .collect();

    // Step 6: reading order by centroid row, then column. Label breaks exact ties.
    survivors.sort_by(|a, b| {
        let (ar, ac) = a.centroid();
        let (br, bc) = b.centroid();
        ar.total_cmp(&br)
            .then(ac.total_cmp(&bc))
            .then(a.label.cmp(&b.label))
    });

    let regions: Vec<WellRegion> = survivors
        .into_iter()
        .enumerate()
        .map(|(id, stats)| build_region(id, stats, &labeling.labels))
        .collect();

    for region in &regions {
        debug!(
            well = region.id,
            area = region.area,
            cx = region.centroid.0,
            cy = region.centroid.1,
            "Well detected"
        );
    }

    if regions.is_empty() {
        warn!(
            threshold,
            min_area = config.min_area,
            candidates,
            "No wells detected"
        );
    } else {
        info!(
            wells = regions.len(),
            candidates,
            threshold,
            min_area = config.min_area,
            "Well detection complete"
        );
    }

    Ok(WellDetection {
        regions,
        threshold,
        config: config.clone(),
        dimensions: (h, w),
    })
}

fn build_region(id: usize, stats: &ComponentStats, labels: &Array2<u32>) -> WellRegion {
    let (min_row, max_row, min_col, max_col) = stats.bbox;
    let window = labels.slice(s![min_row..=max_row, min_col..=max_col]);
    let mask = window.mapv(|l| l == stats.label);
    let (cy, cx) = stats.centroid();

    WellRegion {
        id,
        bbox: BoundingBox {
            x: min_col,
            y: min_row,
            width: max_col - min_col + 1,
            height: max_row - min_row + 1,
        },
        mask,
        centroid: (cx, cy),
        area: stats.area,
    }
}
