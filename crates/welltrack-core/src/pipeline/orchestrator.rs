use tracing::info;

use crate::aggregate::TimeSeriesAggregator;
use crate::detection::detect_wells;
use crate::detection::ThresholdMethod;
use crate::error::{Result, WelltrackError};
use crate::io::source::FrameSource;
use crate::projection::project;

use super::config::AnalysisConfig;
use super::types::{AnalysisStage, CancelToken, NoOpReporter, ProgressReporter, RunOutcome};

/// Run the full analysis: projection, well detection, then intensity tracking.
///
/// Failures carry the stage they happened in along with the detection
/// parameters. A cancelled run returns `RunOutcome::Cancelled`.
pub fn analyze(
    source: &dyn FrameSource,
    config: &AnalysisConfig,
    reporter: &dyn ProgressReporter,
    cancel: &CancelToken,
) -> Result<RunOutcome> {
    let staged = |stage: AnalysisStage, threshold: Option<f32>| {
        let min_area = config.detection.min_area;
        move |e: WelltrackError| match e {
            e @ WelltrackError::Stage { .. } => e,
            other => WelltrackError::Stage {
                stage,
                threshold,
                min_area,
                source: Box::new(other),
            },
        }
    };

    config
        .validate()
        .map_err(staged(AnalysisStage::Configuration, None))?;

    info!(
        source = %source.name(),
        frames = source.frame_count(),
        media = %source.media_kind(),
        metric = %config.metric,
        sample_rate = config.sample_rate,
        "Starting analysis"
    );

    reporter.begin_stage(AnalysisStage::Projection, None);
    let projection = project(source, config.sample_rate)
        .map_err(staged(AnalysisStage::Projection, None))?;
    reporter.finish_stage();

    if cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled {
            frames_processed: 0,
        });
    }

    // Otsu resolves its threshold inside detection.
    let threshold_hint = match config.detection.threshold_method {
        ThresholdMethod::Fixed(v) => Some(v.clamp(0.0, projection.max_value())),
        ThresholdMethod::Otsu => None,
    };
    reporter.begin_stage(AnalysisStage::Detection, None);
    let detection = detect_wells(&projection, &config.detection)
        .map_err(staged(AnalysisStage::Detection, threshold_hint))?;
    reporter.finish_stage();

    let mut aggregator = TimeSeriesAggregator::new(&detection, config.metric, config.sample_rate)
        .with_projection(projection);
    aggregator.run(source, reporter, cancel)
}

/// `analyze` without progress reporting or cancellation.
pub fn analyze_quiet(source: &dyn FrameSource, config: &AnalysisConfig) -> Result<RunOutcome> {
    analyze(source, config, &NoOpReporter, &CancelToken::new())
}
