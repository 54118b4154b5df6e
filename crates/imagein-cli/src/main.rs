mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imagein", about = "Image convolution and morphology tool")]
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
    /// Show image dimensions and per-channel statistics
    Info(commands::info::InfoArgs),
    /// Cut a rectangle out of an image
    Crop(commands::crop::CropArgs),
    /// Convolve an image with a kernel family
    Filter(commands::filter::FilterArgs),
    /// Apply a morphological operator
    Morpho(commands::morpho::MorphoArgs),
    /// Convert between PNG, BMP, JPEG and VFF
    Convert(commands::convert::ConvertArgs),
    /// Run a processing chain from a TOML config
    Run(commands::pipeline::RunArgs),
    /// Print a default pipeline config
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
        Commands::Crop(args) => commands::crop::run(args),
        Commands::Filter(args) => commands::filter::run(args),
        Commands::Morpho(args) => commands::morpho::run(args),
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Run(args) => commands::pipeline::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
