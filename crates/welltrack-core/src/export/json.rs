use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::{BoundingBox, WellId, WellRegion};
use crate::error::Result;
use crate::metrics::Metric;
use crate::result::{AnalysisResult, RunMetadata, WellTimeSeries};

/// Geometry of one well as written to JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WellRoiExport {
    pub well_id: WellId,
    pub bbox: BoundingBox,
    pub centroid: (f64, f64),
    pub area: usize,
    /// Mask as `[row, start_col, length]` runs in frame coordinates.
    pub mask_runs: Vec<[usize; 3]>,
}

impl From<&WellRegion> for WellRoiExport {
    fn from(region: &WellRegion) -> Self {
        Self {
            well_id: region.id,
            bbox: region.bbox,
            centroid: region.centroid,
            area: region.area,
            mask_runs: region.mask_runs(),
        }
    }
}

/// Peak of one well in summary form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakSummaryRow {
    pub well_id: WellId,
    pub intensity: f64,
    pub frame: usize,
    pub metric: Metric,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_coordinate: Option<(usize, usize)>,
}

/// Full analysis document: run parameters, geometry, peaks and series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryExport {
    pub analysis_info: RunMetadata,
    pub well_rois: Vec<WellRoiExport>,
    pub peak_results: Vec<PeakSummaryRow>,
    pub intensity_timeseries: Vec<WellTimeSeries>,
}

impl GeometryExport {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            analysis_info: result.metadata().clone(),
            well_rois: result.wells().iter().map(WellRoiExport::from).collect(),
            peak_results: peak_summary(result),
            intensity_timeseries: result.series().values().cloned().collect(),
        }
    }
}

/// One row per well that has a peak, in well id order.
pub fn peak_summary(result: &AnalysisResult) -> Vec<PeakSummaryRow> {
    let metric = result.metadata().metric;
    result
        .peaks()
        .iter()
        .map(|(&well_id, peak)| PeakSummaryRow {
            well_id,
            intensity: peak.value,
            frame: peak.frame_index,
            metric,
            peak_coordinate: match metric {
                Metric::Peak => peak.peak_coordinate,
                Metric::Average => None,
            },
        })
        .collect()
}

pub fn write_geometry_json(result: &AnalysisResult, path: &Path) -> Result<()> {
    write_json(&GeometryExport::from_result(result), path)
}

pub fn write_peaks_json(result: &AnalysisResult, path: &Path) -> Result<()> {
    write_json(&peak_summary(result), path)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
