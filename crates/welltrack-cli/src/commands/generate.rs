use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use welltrack_core::synthetic::{PlateConfig, SyntheticPlate};

#[derive(Args)]
pub struct GenerateArgs {
    /// Output file: `.ser` writes a video, anything else a PNG still
    pub output: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value = "1280")]
    pub width: usize,

    /// Frame height in pixels
    #[arg(long, default_value = "720")]
    pub height: usize,

    /// Frames per second
    #[arg(long, default_value = "30")]
    pub fps: f64,

    /// Video duration in seconds
    #[arg(long, default_value = "10")]
    pub duration: f64,

    /// Well grid rows
    #[arg(long, default_value = "3")]
    pub rows: usize,

    /// Well grid columns
    #[arg(long, default_value = "4")]
    pub cols: usize,

    /// Well radius in pixels
    #[arg(long, default_value = "30")]
    pub radius: usize,

    /// Peak well brightness (0-255)
    #[arg(long, default_value = "255")]
    pub peak: f32,

    /// Background brightness (0-255)
    #[arg(long, default_value = "0")]
    pub background: f32,

    /// Glow pulse width (FWHM) in frames
    #[arg(long, default_value = "60")]
    pub glow: f64,

    /// Uniform noise amplitude; 0 disables noise
    #[arg(long, default_value = "0")]
    pub noise: f32,

    /// Random seed for peak frames and noise
    #[arg(long, default_value = "0")]
    pub seed: u64,
}

pub fn run(args: &GenerateArgs) -> Result<()> {
    let frames = (args.duration * args.fps).round().max(1.0) as usize;
    let config = PlateConfig {
        width: args.width,
        height: args.height,
        frames,
        fps: args.fps,
        rows: args.rows,
        cols: args.cols,
        radius: args.radius,
        peak_brightness: args.peak,
        background: args.background,
        glow_frames: args.glow,
        noise: args.noise,
        seed: args.seed,
    };
    let plate = SyntheticPlate::new(config).context("Invalid plate parameters")?;

    let is_ser = args
        .output
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("ser"));

    println!(
        "Generating {}x{} plate, {}x{} wells",
        args.width, args.height, args.rows, args.cols
    );
    if is_ser {
        println!("  Frames:  {} at {} fps", frames, args.fps);
        println!("  Peaks:   {:?}", plate.peak_frames);
        plate
            .write_ser(&args.output)
            .with_context(|| format!("Failed to write {}", args.output.display()))?;
    } else {
        plate
            .write_still(&args.output)
            .with_context(|| format!("Failed to write {}", args.output.display()))?;
    }
    println!("Saved to {}", args.output.display());

    Ok(())
}
