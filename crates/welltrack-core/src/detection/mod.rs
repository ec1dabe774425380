pub mod components;
pub mod config;
pub mod morphology;
pub mod region;
pub mod threshold;
pub mod wells;

pub use config::{Connectivity, DetectionConfig, ThresholdMethod};
pub use region::{BoundingBox, WellId, WellRegion};
pub use wells::{detect_wells, WellDetection};
