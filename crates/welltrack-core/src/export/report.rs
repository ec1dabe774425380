use std::fmt::Write;

use crate::frame::MediaKind;
use crate::metrics::Metric;
use crate::result::AnalysisResult;

/// Human-readable report: source, well count, metric, one line per well.
pub fn summary_report(result: &AnalysisResult) -> String {
    let meta = result.metadata();
    let mut text = String::from("--- Analysis Report ---\n");
    let source_label = match meta.media_kind {
        MediaKind::Image => "Image Source",
        MediaKind::Video => "Video Source",
    };
    let metric_label = match meta.metric {
        Metric::Average => "Average",
        Metric::Peak => "Peak",
    };
    let _ = writeln!(text, "{source_label}: {}", meta.source_name);
    let _ = writeln!(text, "Wells Detected: {}", result.wells().len());
    let _ = writeln!(text, "Metric: {metric_label} Intensity");
    let _ = writeln!(text, "Threshold: {} ({})", meta.threshold, meta.threshold_method);
    if meta.media_kind == MediaKind::Video {
        let _ = writeln!(
            text,
            "Frames: {} sampled of {} (every {})",
            meta.sampled_frames, meta.total_frames, meta.sample_rate
        );
        if let (Some(fps), Some(duration)) = (meta.frame_rate, meta.duration_seconds) {
            let _ = writeln!(text, "Frame rate: {fps:.2} fps, duration {duration:.2} s");
        }
    }
    text.push('\n');

    if result.no_wells_detected() {
        text.push_str("No wells detected.\n");
        return text;
    }
    for (id, peak) in result.peaks() {
        match meta.media_kind {
            MediaKind::Video => {
                let _ = writeln!(
                    text,
                    "Well {}: Intensity of {:.2} at Frame {}",
                    id + 1,
                    peak.value,
                    peak.frame_index
                );
            }
            MediaKind::Image => {
                let _ = writeln!(text, "Well {}: Intensity of {:.2}", id + 1, peak.value);
            }
        }
    }
    text
}
