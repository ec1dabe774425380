use std::collections::BTreeMap;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::detection::{WellDetection, WellId};
use crate::error::{Result, WelltrackError};
use crate::frame::{Frame, MediaKind};
use crate::io::source::FrameSource;
use crate::metrics::{extract_validated, validate_regions, Metric};
use crate::pipeline::{AnalysisStage, CancelToken, ProgressReporter, RunOutcome, RunState};
use crate::projection::{projection_description, sampled_count, sampled_indices};
use crate::result::{AnalysisResult, PeakRecord, RunMetadata, WellTimeSeries};

/// Running series and peaks, owned by the aggregator until frozen.
#[derive(Default)]
struct Accumulator {
    series: BTreeMap<WellId, WellTimeSeries>,
    other_series: BTreeMap<WellId, WellTimeSeries>,
    peaks: BTreeMap<WellId, PeakRecord>,
}

/// Walks the sampled frames of a source and builds per-well time series
/// and peak records for an already detected set of wells.
///
/// Both metrics are measured on every sampled frame. Peaks follow the
/// selected metric.
///
/// An aggregator runs once: `Idle -> Running -> Completed | Cancelled | Failed`.
pub struct TimeSeriesAggregator<'a> {
    detection: &'a WellDetection,
    metric: Metric,
    sample_rate: usize,
    projection: Option<Frame>,
    state: RunState,
}

impl<'a> TimeSeriesAggregator<'a> {
    pub fn new(detection: &'a WellDetection, metric: Metric, sample_rate: usize) -> Self {
        Self {
            detection,
            metric,
            sample_rate,
            projection: None,
            state: RunState::Idle,
        }
    }

    /// Attach the image the wells were detected in so the result carries it.
    pub fn with_projection(mut self, projection: Frame) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Process every sampled frame of `source`.
    ///
    /// Cancellation is checked before each frame. `reporter.advance` is
    /// called after each frame with `(processed, total)`. Cancelled and
    /// failed runs return no partial data.
    pub fn run(
        &mut self,
        source: &dyn FrameSource,
        reporter: &dyn ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<RunOutcome> {
        if self.state != RunState::Idle {
            return Err(WelltrackError::InvalidConfiguration(format!(
                "aggregator already used (state {:?})",
                self.state
            )));
        }
        self.state = RunState::Running;

        match self.track(source, reporter, cancel) {
            Ok(outcome) => {
                self.state = if outcome.is_cancelled() {
                    RunState::Cancelled
                } else {
                    RunState::Completed
                };
                Ok(outcome)
            }
            Err(e) => {
                self.state = RunState::Failed;
                Err(self.with_stage(e))
            }
        }
    }

    fn track(
        &mut self,
        source: &dyn FrameSource,
        reporter: &dyn ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<RunOutcome> {
        let detection = self.detection;
        let started_at = Local::now();
        if self.sample_rate == 0 {
            return Err(WelltrackError::InvalidConfiguration(
                "sample_rate must be a positive integer".into(),
            ));
        }
        let frame_count = source.frame_count();
        if frame_count == 0 {
            return Err(WelltrackError::EmptyInput);
        }
        let sample_rate = match source.media_kind() {
            MediaKind::Image => 1,
            MediaKind::Video => self.sample_rate,
        };

        let regions = &detection.regions;
        let (height, width) = source.dimensions();
        validate_regions(regions, width, height)?;

        let mut acc = Accumulator::default();
        let total = if regions.is_empty() {
            warn!(
                source = %source.name(),
                "No wells detected; skipping intensity tracking"
            );
            0
        } else {
            sampled_count(frame_count, sample_rate)
        };

        reporter.begin_stage(AnalysisStage::Tracking, Some(total));
        for region in regions {
            acc.series.insert(region.id, WellTimeSeries::new(region.id));
            acc.other_series.insert(region.id, WellTimeSeries::new(region.id));
        }

        let indices = sampled_indices(frame_count, sample_rate).take(total);
        for (processed, index) in indices.enumerate() {
            if cancel.is_cancelled() {
                info!(frames_processed = processed, total, "Tracking cancelled");
                return Ok(RunOutcome::Cancelled {
                    frames_processed: processed,
                });
            }

            let frame = source.read_frame(index).map_err(|e| WelltrackError::Stage {
                stage: AnalysisStage::Reading,
                threshold: Some(detection.threshold),
                min_area: detection.config.min_area,
                source: Box::new(e),
            })?;
            if frame.data.dim() != (height, width) {
                let r = &regions[0];
                return Err(WelltrackError::RegionOutOfBounds {
                    well_id: r.id,
                    x: r.bbox.x,
                    y: r.bbox.y,
                    width: r.bbox.width,
                    height: r.bbox.height,
                    frame_width: frame.width(),
                    frame_height: frame.height(),
                });
            }

            for (id, mut sample) in extract_validated(&frame, regions, self.metric) {
                sample.frame_index = index;
                let improves = match acc.peaks.get(&id) {
                    None => true,
                    Some(best) => sample.value > best.value,
                };
                if improves {
                    acc.peaks.insert(id, sample);
                }
                if let Some(series) = acc.series.get_mut(&id) {
                    series.samples.push(sample);
                }
            }
            for (id, mut sample) in extract_validated(&frame, regions, self.metric.other()) {
                sample.frame_index = index;
                if let Some(series) = acc.other_series.get_mut(&id) {
                    series.samples.push(sample);
                }
            }
            debug!(frame = index, "Frame measured");
            reporter.advance(processed + 1, total);
        }
        reporter.finish_stage();

        let metadata = RunMetadata {
            threshold_method: detection.config.threshold_method.clone(),
            threshold: detection.threshold,
            background_level: detection.config.background_level,
            min_area: detection.config.min_area,
            opening_iterations: detection.config.opening_iterations,
            connectivity: detection.config.connectivity,
            metric: self.metric,
            sample_rate,
            total_frames: frame_count,
            sampled_frames: total,
            media_kind: source.media_kind(),
            detection_source: projection_description(source, sample_rate),
            source_name: source.name(),
            width,
            height,
            frame_rate: source.frame_rate(),
            duration_seconds: source
                .frame_rate()
                .filter(|fps| *fps > 0.0)
                .map(|fps| frame_count as f64 / fps),
            started_at,
            finished_at: Local::now(),
        };

        info!(
            wells = regions.len(),
            sampled_frames = total,
            metric = %self.metric,
            "Intensity tracking complete"
        );

        Ok(RunOutcome::Completed(AnalysisResult {
            wells: regions.clone(),
            series: acc.series,
            other_series: acc.other_series,
            peaks: acc.peaks,
            metadata,
            projection: self.projection.take(),
        }))
    }

    fn with_stage(&self, e: WelltrackError) -> WelltrackError {
        match e {
            staged @ WelltrackError::Stage { .. } => staged,
            other => WelltrackError::Stage {
                stage: AnalysisStage::Tracking,
                threshold: Some(self.detection.threshold),
                min_area: self.detection.config.min_area,
                source: Box::new(other),
            },
        }
    }
}
