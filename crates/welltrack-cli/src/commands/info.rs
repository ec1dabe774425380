use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use welltrack_core::io::ser::SerReader;
use welltrack_core::io::source::{describe_source, open_source};

#[derive(Args)]
pub struct InfoArgs {
    /// Input SER or image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let is_ser = args
        .file
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("ser"));

    let (info, data_bytes) = if is_ser {
        let reader = SerReader::open(&args.file)
            .with_context(|| format!("Failed to open {}", args.file.display()))?;
        let bytes = reader.header.frame_byte_size() * reader.frame_count();
        (reader.source_info(&args.file), Some(bytes))
    } else {
        let source = open_source(&args.file)
            .with_context(|| format!("Failed to open {}", args.file.display()))?;
        (describe_source(source.as_ref(), &args.file), None)
    };

    println!("File:        {}", info.filename.display());
    println!("Type:        {}", info.media_kind);
    println!("Frames:      {}", info.total_frames);
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("Bit depth:   {}", info.bit_depth);
    println!("Color mode:  {:?}", info.color_mode);

    if let Some(fps) = info.frame_rate {
        println!("Frame rate:  {:.2} fps", fps);
    }
    if let Some(duration) = info.duration_seconds() {
        println!("Duration:    {:.2} s", duration);
    }
    if let Some(ref obs) = info.observer {
        println!("Observer:    {}", obs);
    }
    if let Some(ref tel) = info.telescope {
        println!("Telescope:   {}", tel);
    }
    if let Some(ref inst) = info.instrument {
        println!("Instrument:  {}", inst);
    }
    if let Some(bytes) = data_bytes {
        println!("Data size:   {:.1} MB", bytes as f64 / (1024.0 * 1024.0));
    }

    Ok(())
}
