pub mod csv;
pub mod json;
pub mod preview;
pub mod report;

use std::path::Path;

use crate::frame::MediaKind;
use crate::metrics::Metric;

pub use self::csv::{write_peaks_csv, write_timeseries_csv};
pub use self::json::{
    peak_summary, write_geometry_json, write_peaks_json, GeometryExport, PeakSummaryRow,
    WellRoiExport,
};
pub use self::preview::{draw_well_map, save_peak_snapshots, save_well_map};
pub use self::report::summary_report;

/// Default output file name: `<source-stem>_<metric>_<image|video>.<ext>`.
pub fn default_filename(source: &Path, metric: Metric, media_kind: MediaKind, ext: &str) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "analysis".to_string());
    format!("{stem}_{metric}_{media_kind}.{ext}")
}
