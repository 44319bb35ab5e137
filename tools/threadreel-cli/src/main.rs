//! threadreel CLI — Command-line interface for rendering content bundles.
//!
//! Usage:
//!   threadreel render <PATH>   Render a content bundle to video
//!   threadreel info <PATH>     Show content bundle information
//!   threadreel check           Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "threadreel",
    about = "Narrated vertical video rendering from content bundles",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a content bundle to its final video file(s)
    Render {
        /// Path to the content bundle directory
        path: PathBuf,

        /// Directory where rendered videos are written
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Maximum total video length in seconds
        #[arg(long)]
        max_length: Option<f64>,

        /// Background music volume [0.0, 1.0]; overrides the manifest
        #[arg(long)]
        music_volume: Option<f64>,

        /// Output width
        #[arg(long)]
        width: Option<u32>,

        /// Output height
        #[arg(long)]
        height: Option<u32>,

        /// Skip the narration-only variant
        #[arg(long)]
        no_only_tts: bool,

        /// Keep the temporary bundle directory after rendering
        #[arg(long)]
        keep_temp: bool,
    },

    /// Show content bundle information
    Info {
        /// Path to the content bundle directory
        path: PathBuf,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    threadreel_common::logging::init_logging(&threadreel_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Render {
            path,
            output_dir,
            max_length,
            music_volume,
            width,
            height,
            no_only_tts,
            keep_temp,
        } => {
            commands::render::run(
                path,
                output_dir,
                max_length,
                music_volume,
                width,
                height,
                no_only_tts,
                keep_temp,
            )
            .await
        }
        Commands::Info { path } => commands::info::run(path),
        Commands::Check => commands::check::run(),
    }
}
