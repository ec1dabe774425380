use std::path::Path;

use console::Style;
use welltrack_core::detection::ThresholdMethod;
use welltrack_core::frame::MediaKind;
use welltrack_core::io::source::FrameSource;
use welltrack_core::pipeline::AnalysisConfig;
use welltrack_core::result::AnalysisResult;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_analysis_summary(input: &Path, source: &dyn FrameSource, config: &AnalysisConfig) {
    let s = Styles::new();
    let (h, w) = source.dimensions();

    println!();
    println!("  {}", s.title.apply_to("Welltrack Analysis"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(18)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Source"),
        s.value.apply_to(format!(
            "{} ({} frames, {}x{})",
            source.media_kind(),
            source.frame_count(),
            w,
            h
        ))
    );
    println!();

    println!("  {}", s.header.apply_to("Detection"));
    let method = match config.detection.threshold_method {
        ThresholdMethod::Fixed(v) => format!("fixed {v}"),
        ThresholdMethod::Otsu => "otsu".to_string(),
    };
    println!(
        "    {:<12}{}",
        s.label.apply_to("Threshold"),
        s.method.apply_to(method)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Min area"),
        s.value.apply_to(format!("{} px", config.detection.min_area))
    );
    if config.detection.background_level > 0.0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Background"),
            s.value.apply_to(config.detection.background_level)
        );
    }
    if config.detection.opening_iterations > 0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Opening"),
            s.value.apply_to(config.detection.opening_iterations)
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Adjacency"),
        s.value.apply_to(config.detection.connectivity)
    );
    println!();

    println!("  {}", s.header.apply_to("Tracking"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Metric"),
        s.method.apply_to(config.metric)
    );
    if source.media_kind() == MediaKind::Video {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Stride"),
            s.value.apply_to(format!("every {} frame(s)", config.sample_rate))
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Stride"),
            s.disabled.apply_to("single image")
        );
    }
    println!();
}

pub fn print_result_summary(result: &AnalysisResult) {
    let s = Styles::new();
    let meta = result.metadata();

    println!("  {}", s.header.apply_to("Results"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Threshold"),
        s.value.apply_to(meta.threshold)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Wells"),
        s.value.apply_to(result.wells().len())
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Frames"),
        s.value
            .apply_to(format!("{} of {}", meta.sampled_frames, meta.total_frames))
    );
    println!();

    for (id, peak) in result.peaks() {
        let at = match meta.media_kind {
            MediaKind::Video => format!(" at frame {}", peak.frame_index),
            MediaKind::Image => String::new(),
        };
        println!(
            "    {:<12}{}{}",
            s.label.apply_to(format!("Well {}", id + 1)),
            s.value.apply_to(format!("{:.2}", peak.value)),
            at
        );
    }
    if !result.peaks().is_empty() {
        println!();
    }
}
