use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::result::AnalysisResult;

/// Analysis stage, used for progress reporting and error context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisStage {
    Configuration,
    Reading,
    Projection,
    Detection,
    Tracking,
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "Validating configuration"),
            Self::Reading => write!(f, "Reading frames"),
            Self::Projection => write!(f, "Projecting frames"),
            Self::Detection => write!(f, "Detecting wells"),
            Self::Tracking => write!(f, "Tracking intensities"),
        }
    }
}

/// Thread-safe progress reporting for an analysis run.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations. `advance`
/// is called synchronously on the analysis thread after each sampled frame.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items
    /// in this stage (e.g., sampled frame count), if known.
    fn begin_stage(&self, _stage: AnalysisStage, _total_items: Option<usize>) {}

    /// `items_done` of `items_total` work items in the current stage are complete.
    fn advance(&self, _items_done: usize, _items_total: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Cooperative cancellation flag shared between a run and its controller.
///
/// Cloning yields a handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Lifecycle of a tracking run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Terminal outcome of a run that did not fail.
#[derive(Clone, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum RunOutcome {
    /// Every sampled frame was processed.
    Completed(AnalysisResult),
    /// The run stopped at a cancellation check; partial data was discarded.
    Cancelled { frames_processed: usize },
}

impl RunOutcome {
    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Cancelled { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
