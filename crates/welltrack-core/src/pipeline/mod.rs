pub mod config;
mod orchestrator;
mod types;

pub use config::AnalysisConfig;
pub use orchestrator::{analyze, analyze_quiet};
pub use types::{
    AnalysisStage, CancelToken, NoOpReporter, ProgressReporter, RunOutcome, RunState,
};
