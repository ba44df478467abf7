//! CLI module for TrimChap
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

/// TrimChap
///
/// Reads trims from Avisynth scripts and writes ordered Matroska chapter
/// files, optionally linking external opening and ending files.
#[derive(Parser, Debug)]
#[command(name = "trimchap")]
#[command(about = "Build Matroska chapters from Avisynth trim scripts")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: trimchap.toml, then config/trimchap.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// mediainfo executable used for probing
    #[arg(long, env = "TRIMCHAP_MEDIAINFO", default_value = "mediainfo", global = true)]
    pub mediainfo: PathBuf,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a chapter file for a script, or for every script in a directory
    Chapters(args::ChaptersArgs),
    /// Print the trimmed frames and timestamps of a script
    Trims(args::TrimsArgs),
    /// Print the resolved source and custom commands of a script
    Source(args::SourceArgs),
    /// Append the source frame rate to a script, or to every script in a directory
    StampFps(args::StampArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chapters() {
        let cli = Cli::parse_from([
            "trimchap",
            "--log-format",
            "json",
            "chapters",
            "ep01.avs",
            "--fps",
            "23.976",
            "--op",
            "op.mkv",
            "--dry-run",
        ]);

        assert_eq!(cli.log_format, Some(LogFormat::Json));
        match cli.command {
            Commands::Chapters(args) => {
                assert_eq!(args.path, PathBuf::from("ep01.avs"));
                assert_eq!(args.fps, Some(23.976));
                assert_eq!(args.op, Some(PathBuf::from("op.mkv")));
                assert!(args.ed.is_none());
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_stamp_fps() {
        let cli = Cli::parse_from(["trimchap", "stamp-fps", "scripts/", "--log-level", "debug"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Commands::StampFps(_)));
    }
}
