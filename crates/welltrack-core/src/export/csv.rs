use std::io::Write;

use crate::error::Result;
use crate::metrics::Metric;
use crate::result::AnalysisResult;

use super::json::peak_summary;

/// One row per sampled frame for `metric`: `frame,time_s,well_1,well_2,...`.
///
/// Every run measures both metrics, so either sheet can be written.
/// `time_s` is left empty when the frame rate is unknown. Well columns are
/// numbered from 1.
pub fn write_timeseries_csv<W: Write>(
    result: &AnalysisResult,
    metric: Metric,
    out: W,
) -> Result<()> {
    let series = result.series_for_metric(metric);
    let mut wtr = csv::Writer::from_writer(out);

    let mut header = vec!["frame".to_string(), "time_s".to_string()];
    header.extend(series.keys().map(|id| format!("well_{}", id + 1)));
    wtr.write_record(&header)?;

    let meta = result.metadata();
    for (row, frame) in result.sampled_frame_indices().into_iter().enumerate() {
        let mut record = vec![
            frame.to_string(),
            meta.frame_time(frame).map(|t| format!("{t:.4}")).unwrap_or_default(),
        ];
        record.extend(series.values().map(|s| {
            s.samples
                .get(row)
                .map(|m| format!("{:.4}", m.value))
                .unwrap_or_default()
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// `well,intensity,frame,peak_x,peak_y`, one row per well.
pub fn write_peaks_csv<W: Write>(result: &AnalysisResult, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["well", "intensity", "frame", "peak_x", "peak_y"])?;

    for row in peak_summary(result) {
        let (px, py) = match row.peak_coordinate {
            Some((x, y)) => (x.to_string(), y.to_string()),
            None => (String::new(), String::new()),
        };
        wtr.write_record(&[
            (row.well_id + 1).to_string(),
            format!("{:.4}", row.intensity),
            row.frame.to_string(),
            px,
            py,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
