//! TrimChap
//!
//! Builds ordered Matroska chapter files from the trims of Avisynth scripts.
//!
//! # Usage
//!
//! ```bash
//! trimchap chapters ep01.avs --op op.mkv --ed ed.mkv
//! trimchap chapters scripts/ --names-config names.json
//! trimchap trims ep01.avs --json
//! trimchap stamp-fps scripts/
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use trimchap::cli::{commands, Cli, Commands};
use trimchap::config::AppConfig;
use trimchap::probe::{MediaProbe, MediainfoProbe};
use trimchap::utils::logging::init_logging;

/// Main entry point for the TrimChap CLI application
fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_cli_overrides(cli.log_level.as_deref(), cli.log_format);
    init_logging(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting TrimChap");

    let probe: Arc<dyn MediaProbe> = Arc::new(MediainfoProbe::new(&cli.mediainfo));

    match cli.command {
        Commands::Chapters(args) => {
            info!("Executing chapters command");
            commands::chapters(args, config, probe)?;
        }
        Commands::Trims(args) => {
            info!("Executing trims command");
            commands::trims(args, probe)?;
        }
        Commands::Source(args) => {
            info!("Executing source command");
            commands::source(args)?;
        }
        Commands::StampFps(args) => {
            info!("Executing stamp-fps command");
            commands::stamp_fps(args, probe)?;
        }
    }

    Ok(())
}
