//! Per-episode overrides keyed by script file name
//!
//! ```json
//! {
//!   "ep01.avs": { "names": ["prologue", "part a"], "op": "op.mkv", "ed": "ed.mkv" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChapterError, ChapterResult};

/// Overrides for a single script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeOverride {
    /// Chapter names, one per segment
    pub names: Vec<String>,
    /// Opening file used when none is given on the command line
    pub op: Option<PathBuf>,
    /// Ending file used when none is given on the command line
    pub ed: Option<PathBuf>,
}

impl EpisodeOverride {
    /// Capitalized fixed names, or `None` when the list is empty
    pub fn fixed_names(&self) -> Option<Vec<String>> {
        if self.names.is_empty() {
            return None;
        }
        Some(self.names.iter().map(|name| capitalize(name)).collect())
    }
}

/// All episode overrides of one JSON file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeOverrides {
    entries: BTreeMap<String, EpisodeOverride>,
}

impl EpisodeOverrides {
    pub fn from_json_str(content: &str) -> ChapterResult<Self> {
        serde_json::from_str(content).map_err(|e| ChapterError::Config {
            message: format!("Failed to parse episode overrides: {}", e),
        })
    }

    pub fn from_path(path: &Path) -> ChapterResult<Self> {
        if !path.is_file() {
            return Err(ChapterError::Config {
                message: format!("Episode overrides file does not exist: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let overrides = Self::from_json_str(&content)?;
        debug!(path = %path.display(), episodes = overrides.len(), "Loaded episode overrides");
        Ok(overrides)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Override for a script, looked up by its file name
    pub fn for_script(&self, script: &Path) -> Option<&EpisodeOverride> {
        let name = script.file_name()?.to_str()?;
        self.entries.get(name)
    }
}

/// First character upper-case, the rest lower-case
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
