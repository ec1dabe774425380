pub mod aggregate;
pub mod consts;
pub mod detection;
pub mod error;
pub mod export;
pub mod frame;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod projection;
pub mod result;
pub mod synthetic;

pub use aggregate::TimeSeriesAggregator;
pub use detection::{detect_wells, DetectionConfig, WellDetection, WellRegion};
pub use error::{Result, WelltrackError};
pub use frame::{Frame, MediaKind};
pub use io::source::{open_source, FrameSource};
pub use metrics::{extract, Metric, MetricSample};
pub use pipeline::{analyze, AnalysisConfig, CancelToken, ProgressReporter, RunOutcome};
pub use projection::project;
pub use result::{AnalysisResult, PeakRecord, RunMetadata, WellTimeSeries};
