//! Avisynth-style script parsing
//!
//! A script is read once into a [`ScriptDocument`]; the descriptor, custom
//! command and annotation parsers and the trim extractor all work on the
//! same materialized lines.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ensure_frame_rate, ChapterError, ChapterResult};

pub mod annotation;
pub mod commands;
pub mod descriptor;

pub use annotation::ChapterAnnotation;
pub use commands::ScriptCommands;

/// Prefix of custom directive lines (`##>key=value`)
pub const COMMAND_MARKER: &str = "##>";
/// Prefix of the chapter annotation line (`##!! <name[start:end], ...>`)
pub const ANNOTATION_MARKER: &str = "##!!";
/// Script file extension handled in batch mode
pub const SCRIPT_EXTENSION: &str = "avs";

/// Script text split into lines, with line terminators removed
#[derive(Debug, Clone)]
pub struct ScriptDocument {
    path: PathBuf,
    lines: Vec<String>,
}

impl ScriptDocument {
    /// Read a script from disk
    pub fn from_path(path: impl AsRef<Path>) -> ChapterResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ChapterError::MissingSourceFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_text(path, &content))
    }

    /// Build a document from in-memory text; `path` is used for error
    /// reporting and for resolving paths relative to the script
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        let lines = text
            .lines()
            .map(|line| line.trim_end_matches(['\r', '\n']).to_string())
            .collect();

        Self {
            path: path.into(),
            lines,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the script (empty for bare file names)
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Parse the `##>` directives and the `##!!` chapter annotation
    pub fn commands(&self) -> ChapterResult<ScriptCommands> {
        ScriptCommands::parse(&self.lines)
    }

    /// Variable assignments, lower-cased, later assignments winning
    pub fn variables(&self) -> BTreeMap<String, String> {
        descriptor::defined_variables(&self.lines)
    }

    /// Resolve the file handed to the video decoder call
    pub fn source(&self) -> ChapterResult<String> {
        descriptor::resolve_source(&self.path.display().to_string(), &self.lines)
    }
}

/// Append a `##>frame_rate=` directive so later runs can skip probing
pub fn append_frame_rate(path: &Path, frame_rate: f64) -> ChapterResult<()> {
    let frame_rate = ensure_frame_rate(frame_rate)?;
    if !path.is_file() {
        return Err(ChapterError::MissingSourceFile {
            path: path.display().to_string(),
        });
    }

    let mut file = OpenOptions::new().append(true).open(path)?;
    write!(file, "\n{}frame_rate={:.3}\n", COMMAND_MARKER, frame_rate)?;

    info!(script = %path.display(), frame_rate, "Frame rate added to script");
    Ok(())
}
