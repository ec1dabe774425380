use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use welltrack_core::consts::DEFAULT_SAMPLE_RATE;
use welltrack_core::detection::{Connectivity, DetectionConfig, ThresholdMethod};
use welltrack_core::export::{
    default_filename, save_peak_snapshots, save_well_map, summary_report, write_geometry_json,
    write_peaks_csv, write_peaks_json, write_timeseries_csv,
};
use welltrack_core::io::source::open_source;
use welltrack_core::metrics::Metric;
use welltrack_core::pipeline::{
    analyze, AnalysisConfig, AnalysisStage, CancelToken, ProgressReporter, RunOutcome,
};
use welltrack_core::result::AnalysisResult;
use welltrack_core::FrameSource;

use crate::summary::{print_analysis_summary, print_result_summary};

#[derive(Clone, Copy, ValueEnum)]
pub enum MetricArg {
    Average,
    Peak,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Average => Metric::Average,
            MetricArg::Peak => Metric::Peak,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    /// Geometry, series and peaks as one JSON document
    Json,
    /// Peak summary as JSON
    PeaksJson,
    /// Per-frame intensities as CSV, one file per metric
    Csv,
    /// Peak summary as CSV
    PeaksCsv,
    /// Plain-text report
    Report,
    /// Detection image with wells outlined
    WellMap,
    /// Each well's peak frame with the well outlined
    Snapshots,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input SER video or image file
    pub file: PathBuf,

    /// Analysis config file (TOML); overrides the detection flags below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fixed intensity threshold in the source's units
    #[arg(long, default_value = "50")]
    pub threshold: f32,

    /// Pick the threshold automatically with Otsu's method
    #[arg(long)]
    pub otsu: bool,

    /// Minimum well area in pixels
    #[arg(long, default_value = "100")]
    pub min_area: usize,

    /// Background level subtracted before thresholding
    #[arg(long, default_value = "0")]
    pub background: f32,

    /// 3x3 opening passes to split touching wells
    #[arg(long, default_value = "0")]
    pub opening: usize,

    /// Use 4-connectivity instead of 8
    #[arg(long)]
    pub four_connected: bool,

    /// Brightness metric
    #[arg(long, value_enum, default_value = "average")]
    pub metric: MetricArg,

    /// Analyse every Nth frame of a video (default 1, or the config file's value)
    #[arg(long)]
    pub sample_rate: Option<usize>,

    /// Directory for exported files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Comma-separated exports to write
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "json,csv,report,well-map"
    )]
    pub export: Vec<ExportKind>,
}

/// Drives an indicatif bar from the analysis stages.
struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:22} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: AnalysisStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(0) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize, _items_total: usize) {
        self.bar.set_position(items_done as u64);
    }
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let mut config: AnalysisConfig =
            toml::from_str(&contents).context("Invalid analysis config")?;
        if let Some(rate) = args.sample_rate {
            config.sample_rate = rate;
        }
        config
    } else {
        build_config_from_args(args)
    };

    let source = open_source(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    print_analysis_summary(&args.file, source.as_ref(), &config);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("Interrupt received, stopping before the next frame");
        handler_token.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;

    let reporter = BarReporter::new()?;
    let outcome = analyze(source.as_ref(), &config, &reporter, &cancel);
    reporter.bar.finish_and_clear();

    let result = match outcome.context("Analysis failed")? {
        RunOutcome::Completed(result) => result,
        RunOutcome::Cancelled { frames_processed } => {
            println!("Cancelled after {frames_processed} frames; nothing written.");
            return Ok(());
        }
    };

    print_result_summary(&result);
    if result.no_wells_detected() {
        println!("No wells detected. Try lowering --threshold or --min-area.");
    }

    write_exports(args, &result, source.as_ref())
}

fn build_config_from_args(args: &AnalyzeArgs) -> AnalysisConfig {
    let threshold_method = if args.otsu {
        ThresholdMethod::Otsu
    } else {
        ThresholdMethod::Fixed(args.threshold)
    };
    let connectivity = if args.four_connected {
        Connectivity::Four
    } else {
        Connectivity::Eight
    };

    AnalysisConfig {
        detection: DetectionConfig {
            threshold_method,
            min_area: args.min_area,
            background_level: args.background,
            opening_iterations: args.opening,
            connectivity,
        },
        metric: args.metric.into(),
        sample_rate: args.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE),
    }
}

fn write_exports(args: &AnalyzeArgs, result: &AnalysisResult, source: &dyn FrameSource) -> Result<()> {
    if args.export.is_empty() {
        return Ok(());
    }
    if !args.output_dir.is_dir() {
        std::fs::create_dir_all(&args.output_dir).with_context(|| {
            format!("Failed to create output directory {}", args.output_dir.display())
        })?;
    }

    let meta = result.metadata();
    let name_for = |metric: Metric, ext: &str| {
        args.output_dir
            .join(default_filename(&args.file, metric, meta.media_kind, ext))
    };
    let name = |ext: &str| name_for(meta.metric, ext);

    for kind in &args.export {
        let written: PathBuf = match kind {
            ExportKind::Json => {
                let path = name("json");
                write_geometry_json(result, &path)?;
                path
            }
            ExportKind::PeaksJson => {
                let path = name("peaks.json");
                write_peaks_json(result, &path)?;
                path
            }
            ExportKind::Csv => {
                for metric in Metric::ALL {
                    let path = name_for(metric, "csv");
                    write_with(&path, |w| Ok(write_timeseries_csv(result, metric, w)?))?;
                    report_written(&path);
                }
                continue;
            }
            ExportKind::PeaksCsv => {
                let path = name("peaks.csv");
                write_with(&path, |w| Ok(write_peaks_csv(result, w)?))?;
                path
            }
            ExportKind::Report => {
                let path = name("txt");
                std::fs::write(&path, summary_report(result))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                path
            }
            ExportKind::WellMap => {
                let path = name("wells.png");
                save_well_map(result, &path)?;
                path
            }
            ExportKind::Snapshots => {
                let stem = args
                    .file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "analysis".into());
                let paths = save_peak_snapshots(result, source, &args.output_dir, &stem)?;
                println!("Saved {} peak snapshots to {}", paths.len(), args.output_dir.display());
                continue;
            }
        };
        report_written(&written);
    }
    Ok(())
}

fn report_written(path: &Path) {
    info!(path = %path.display(), "Export written");
    println!("Saved {}", path.display());
}

fn write_with<F>(path: &Path, f: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    f(&mut writer)?;
    writer.flush()?;
    Ok(())
}
