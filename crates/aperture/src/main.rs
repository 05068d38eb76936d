//! Aperture CLI - photo analysis with exposure, color, edge and focus metrics.
//!
//! Aperture ingests photographs, stores them under unique keys, computes a
//! deterministic metric report for each and keeps a small JPEG preview.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a single photo
//! aperture analyze photo.jpg
//!
//! # Analyze a directory, one JSON object per line
//! aperture analyze ./shoot/ --format jsonl --output report.jsonl
//!
//! # Fetch a stored preview
//! aperture thumbnail thumb_<key> --output preview.jpg
//!
//! # Reference tables
//! aperture settings portrait
//! aperture lighting golden_hour
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Aperture - photo analysis with exposure, color, edge and focus metrics.
#[derive(Parser, Debug)]
#[command(name = "aperture")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze photos and report quality metrics
    Analyze(cli::analyze::AnalyzeArgs),

    /// Write a stored thumbnail to a file or stdout
    Thumbnail(cli::thumbnail::ThumbnailArgs),

    /// Show recommended camera settings for a scenario
    Settings(cli::guide::SettingsArgs),

    /// Describe a lighting scenario
    Lighting(cli::guide::LightingArgs),

    /// Explain a composition technique
    Composition(cli::guide::CompositionArgs),

    /// Get simulated critique (no image inference)
    Advise(cli::guide::AdviseArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match aperture_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `aperture config path`."
            );
            aperture_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Aperture v{}", aperture_core::VERSION);

    match cli.command {
        Commands::Analyze(args) => cli::analyze::execute(args, config).await,
        Commands::Thumbnail(args) => cli::thumbnail::execute(args, config).await,
        Commands::Settings(args) => cli::guide::settings(args),
        Commands::Lighting(args) => cli::guide::lighting(args),
        Commands::Composition(args) => cli::guide::composition(args),
        Commands::Advise(args) => cli::guide::advise(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
