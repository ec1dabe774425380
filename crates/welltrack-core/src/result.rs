use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::detection::{Connectivity, ThresholdMethod, WellId, WellRegion};
use crate::frame::{Frame, MediaKind};
use crate::metrics::{Metric, MetricSample};

/// Samples for one well, one per sampled frame in frame order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WellTimeSeries {
    pub well_id: WellId,
    pub samples: Vec<MetricSample>,
}

impl WellTimeSeries {
    pub fn new(well_id: WellId) -> Self {
        Self {
            well_id,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }
}

/// The brightest sample seen for a well. Equal values keep the earliest frame.
pub type PeakRecord = MetricSample;

/// Parameters and context of one analysis run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub threshold_method: ThresholdMethod,
    /// Threshold actually applied to the detection image.
    pub threshold: f32,
    pub background_level: f32,
    pub min_area: usize,
    pub opening_iterations: usize,
    pub connectivity: Connectivity,
    pub metric: Metric,
    /// Effective stride; always 1 for still images.
    pub sample_rate: usize,
    pub total_frames: usize,
    pub sampled_frames: usize,
    pub media_kind: MediaKind,
    /// How the detection image was formed.
    pub detection_source: String,
    pub source_name: String,
    pub width: usize,
    pub height: usize,
    pub frame_rate: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl RunMetadata {
    /// Seconds from the start of the source to `frame_index`, when the
    /// frame rate is known.
    pub fn frame_time(&self, frame_index: usize) -> Option<f64> {
        self.frame_rate
            .filter(|fps| *fps > 0.0)
            .map(|fps| frame_index as f64 / fps)
    }
}

/// Immutable snapshot of a completed analysis.
#[derive(Clone, Debug)]
pub struct AnalysisResult {
    pub(crate) wells: Vec<WellRegion>,
    pub(crate) series: BTreeMap<WellId, WellTimeSeries>,
    /// Series for the metric that was not selected.
    pub(crate) other_series: BTreeMap<WellId, WellTimeSeries>,
    pub(crate) peaks: BTreeMap<WellId, PeakRecord>,
    pub(crate) metadata: RunMetadata,
    pub(crate) projection: Option<Frame>,
}

impl AnalysisResult {
    pub fn wells(&self) -> &[WellRegion] {
        &self.wells
    }

    pub fn well(&self, id: WellId) -> Option<&WellRegion> {
        self.wells.get(id)
    }

    pub fn series(&self) -> &BTreeMap<WellId, WellTimeSeries> {
        &self.series
    }

    pub fn series_for(&self, id: WellId) -> Option<&WellTimeSeries> {
        self.series.get(&id)
    }

    /// Series for either metric. Both are measured on every sampled frame;
    /// `series()` is the selected one.
    pub fn series_for_metric(&self, metric: Metric) -> &BTreeMap<WellId, WellTimeSeries> {
        if metric == self.metadata.metric {
            &self.series
        } else {
            &self.other_series
        }
    }

    pub fn peaks(&self) -> &BTreeMap<WellId, PeakRecord> {
        &self.peaks
    }

    pub fn peak_for(&self, id: WellId) -> Option<&PeakRecord> {
        self.peaks.get(&id)
    }

    pub fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    /// Image the wells were detected in, when the run was given one.
    pub fn projection(&self) -> Option<&Frame> {
        self.projection.as_ref()
    }

    pub fn no_wells_detected(&self) -> bool {
        self.wells.is_empty()
    }

    /// Frame indices that were sampled, in order.
    pub fn sampled_frame_indices(&self) -> Vec<usize> {
        self.series
            .values()
            .next()
            .map(|s| s.samples.iter().map(|m| m.frame_index).collect())
            .unwrap_or_default()
    }
}
