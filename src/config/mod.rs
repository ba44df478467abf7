//! Configuration loading
//!
//! Precedence, highest first: CLI flags, `TRIMCHAP_*` environment
//! variables, the TOML file, built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chapters::NamingPolicy;
use crate::error::{ChapterError, ChapterResult};
use crate::utils::logging::{LogFormat, LoggingConfig};

pub mod episodes;

pub use episodes::{EpisodeOverride, EpisodeOverrides};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "TRIMCHAP_";

/// Files tried, in order, when no explicit config path is given
pub const CONFIG_SEARCH_PATHS: [&str; 2] = ["trimchap.toml", "config/trimchap.toml"];

/// Chapter document rendering options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub language: String,
    pub country: String,
    pub edition_default: bool,
    /// Appended to the script stem to name the chapter file
    pub output_suffix: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            country: "us".to_string(),
            edition_default: true,
            output_suffix: "_chapter.xml".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub naming: NamingPolicy,
    pub document: DocumentConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> ChapterResult<Self> {
        toml::from_str(content).map_err(|e| ChapterError::Config {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> ChapterResult<Self> {
        if !path.is_file() {
            return Err(ChapterError::Config {
                message: format!("Config file does not exist: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Locate the config file: the explicit path when given, else the first
    /// existing entry of [`CONFIG_SEARCH_PATHS`] under `base`.
    pub fn locate(explicit: Option<&Path>, base: &Path) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        CONFIG_SEARCH_PATHS
            .iter()
            .map(|candidate| base.join(candidate))
            .find(|candidate| candidate.is_file())
    }

    /// Defaults, then file, then environment
    pub fn load(explicit: Option<&Path>) -> ChapterResult<Self> {
        let mut config = match Self::locate(explicit, Path::new("")) {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                Self::from_file(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `TRIMCHAP_*` overrides read through `lookup`; returns how many
    /// were applied
    pub fn apply_env_from<F>(&mut self, lookup: F) -> ChapterResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        let mut var = |name: &str| {
            let key = format!("{}{}", ENV_PREFIX, name);
            let value = lookup(&key);
            if let Some(value) = &value {
                debug!(key = %key, value = %value, "Environment override");
                applied += 1;
            }
            value.map(|value| (key, value))
        };

        if let Some((key, value)) = var("GAP_THRESHOLD") {
            self.naming.gap_threshold = parse_env(&key, &value)?;
        }
        if let Some((key, value)) = var("INTRO_MAX_DURATION") {
            self.naming.intro_max_duration = parse_env(&key, &value)?;
        }
        if let Some((key, value)) = var("SMOOTH_BOUNDARIES") {
            self.naming.smooth_boundaries = parse_env(&key, &value)?;
        }
        if let Some((_, value)) = var("LANGUAGE") {
            self.document.language = value;
        }
        if let Some((_, value)) = var("COUNTRY") {
            self.document.country = value;
        }
        if let Some((key, value)) = var("EDITION_DEFAULT") {
            self.document.edition_default = parse_env(&key, &value)?;
        }
        if let Some((_, value)) = var("OUTPUT_SUFFIX") {
            self.document.output_suffix = value;
        }
        if let Some((_, value)) = var("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some((key, value)) = var("LOG_FORMAT") {
            self.logging.format = parse_env(&key, &value)?;
        }

        if applied > 0 {
            info!(count = applied, "Applied environment overrides");
        }
        Ok(applied)
    }

    /// Apply command line logging flags
    pub fn apply_cli_overrides(&mut self, log_level: Option<&str>, log_format: Option<LogFormat>) {
        if let Some(level) = log_level {
            self.logging.level = level.to_string();
        }
        if let Some(format) = log_format {
            self.logging.format = format;
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> ChapterResult<T> {
    value.trim().parse().map_err(|_| ChapterError::Config {
        message: format!("Invalid value for {}: {}", key, value),
    })
}
