//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the chapters command
#[derive(Args, Debug)]
pub struct ChaptersArgs {
    /// Script file, or directory searched recursively for .avs scripts
    pub path: PathBuf,

    /// Frame rate, overriding the script directive and the probe
    #[arg(long)]
    pub fps: Option<f64>,

    /// Opening file linked by segment UID
    #[arg(long)]
    pub op: Option<PathBuf>,

    /// Ending file linked by segment UID
    #[arg(long)]
    pub ed: Option<PathBuf>,

    /// JSON file with per-script chapter names and opening/ending files
    #[arg(long)]
    pub names_config: Option<PathBuf>,

    /// Output file (single script only; default: <script>_chapter.xml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the chapter file instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the trims command
#[derive(Args, Debug)]
pub struct TrimsArgs {
    /// Script file
    pub script: PathBuf,

    /// Frame rate, overriding the script directive and the probe
    #[arg(long)]
    pub fps: Option<f64>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the source command
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Script file
    pub script: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the stamp-fps command
#[derive(Args, Debug)]
pub struct StampArgs {
    /// Script file, or directory searched recursively for .avs scripts
    pub path: PathBuf,

    /// Frame rate to write instead of probing the source
    #[arg(long)]
    pub fps: Option<f64>,
}
