mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "welltrack", about = "Well detection and brightness tracking")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show SER/image file metadata
    Info(commands::info::InfoArgs),
    /// Detect wells and track their brightness
    Analyze(commands::analyze::AnalyzeArgs),
    /// Print or save the default analysis config as TOML
    Config(commands::config::ConfigArgs),
    /// Generate a synthetic well plate video or image
    Generate(commands::generate::GenerateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Generate(args) => commands::generate::run(args),
    }
}
