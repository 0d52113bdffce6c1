mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lbp", about = "Local Binary Pattern texture descriptors")]
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
    /// Describe an operator: geometry, labels and output shape
    Info(commands::info::InfoArgs),
    /// Compute the LBP code image of an image file
    Extract(commands::extract::ExtractArgs),
    /// Compute block histograms (LBPHS) of one or more images
    Histogram(commands::histogram::HistogramArgs),
    /// Print or save the default configuration as TOML
    Config(commands::config::ConfigArgs),
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
        Commands::Extract(args) => commands::extract::run(args),
        Commands::Histogram(args) => commands::histogram::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
