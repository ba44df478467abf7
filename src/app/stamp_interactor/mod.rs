// Stamp interactor - Records the source frame rate inside scripts

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use crate::app::chapter_job::{find_scripts, resolve_source_path};
use crate::error::{ensure_frame_rate, ChapterError, ChapterResult};
use crate::probe::MediaProbe;
use crate::script::{append_frame_rate, ScriptDocument};

/// What happened to one script
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StampOutcome {
    Stamped(f64),
    /// Script already carries a `frame_rate` directive
    AlreadyStamped(f64),
}

/// Result of stamping a directory
#[derive(Debug, Default)]
pub struct StampSummary {
    pub stamped: Vec<(PathBuf, StampOutcome)>,
    pub failures: Vec<(PathBuf, ChapterError)>,
}

/// Appends `##>frame_rate=` directives to scripts
pub struct StampInteractor {
    probe: Arc<dyn MediaProbe>,
}

impl StampInteractor {
    pub fn new(probe: Arc<dyn MediaProbe>) -> Self {
        Self { probe }
    }

    /// Stamp one script with `frame_rate`, or with the probed rate of its
    /// source when none is given
    pub fn stamp(&self, script: &Path, frame_rate: Option<f64>) -> ChapterResult<StampOutcome> {
        let document = ScriptDocument::from_path(script)?;
        let commands = document.commands()?;

        if let Some(existing) = commands.frame_rate()? {
            info!(script = %script.display(), frame_rate = existing, "Script already has a frame rate");
            return Ok(StampOutcome::AlreadyStamped(existing));
        }

        let frame_rate = match frame_rate {
            Some(frame_rate) => ensure_frame_rate(frame_rate)?,
            None => {
                let source = resolve_source_path(&document, &commands)?;
                if !source.is_file() {
                    return Err(ChapterError::MissingSourceFile {
                        path: source.display().to_string(),
                    });
                }
                self.probe.frame_rate(&source)?
            }
        };

        append_frame_rate(script, frame_rate)?;
        Ok(StampOutcome::Stamped(frame_rate))
    }

    /// Stamp every script under `root`
    pub fn stamp_all(&self, root: &Path, frame_rate: Option<f64>) -> ChapterResult<StampSummary> {
        let mut summary = StampSummary::default();

        for script in find_scripts(root)? {
            match self.stamp(&script, frame_rate) {
                Ok(outcome) => summary.stamped.push((script, outcome)),
                Err(e) => {
                    error!(script = %script.display(), error = %e, "Failed to stamp frame rate");
                    summary.failures.push((script, e));
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ChapterAsset;
    use tempfile::TempDir;

    struct FixedRate(f64);

    impl MediaProbe for FixedRate {
        fn frame_rate(&self, _path: &Path) -> ChapterResult<f64> {
            Ok(self.0)
        }

        fn asset(&self, path: &Path) -> ChapterResult<ChapterAsset> {
            Err(ChapterError::MissingSourceFile {
                path: path.display().to_string(),
            })
        }
    }

    fn interactor() -> StampInteractor {
        StampInteractor::new(Arc::new(FixedRate(23.976023976)))
    }

    #[test]
    fn test_stamp_probes_existing_source() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ep01.mkv"), b"").unwrap();
        let script = dir.path().join("ep01.avs");
        std::fs::write(&script, "FFVideoSource(\"ep01.mkv\")").unwrap();

        let outcome = interactor().stamp(&script, None).unwrap();
        assert_eq!(outcome, StampOutcome::Stamped(23.976023976));

        let content = std::fs::read_to_string(&script).unwrap();
        assert!(content.ends_with("\n##>frame_rate=23.976\n"));

        // A second run leaves the script alone
        let again = interactor().stamp(&script, None).unwrap();
        assert_eq!(again, StampOutcome::AlreadyStamped(23.976));
        assert_eq!(std::fs::read_to_string(&script).unwrap(), content);
    }

    #[test]
    fn test_stamp_requires_source_file() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("ep01.avs");
        std::fs::write(&script, "FFVideoSource(\"ep01.mkv\")").unwrap();

        assert!(matches!(
            interactor().stamp(&script, None),
            Err(ChapterError::MissingSourceFile { .. })
        ));
    }

    #[test]
    fn test_explicit_rate_skips_probe() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("ep01.avs");
        std::fs::write(&script, "Trim(0,100)").unwrap();

        let outcome = interactor().stamp(&script, Some(25.0)).unwrap();
        assert_eq!(outcome, StampOutcome::Stamped(25.0));
        assert!(std::fs::read_to_string(&script).unwrap().contains("##>frame_rate=25.000"));
    }

    #[test]
    fn test_stamp_all() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.avs"), "Trim(0,100)").unwrap();
        std::fs::write(dir.path().join("b.avs"), "##>frame_rate=oops").unwrap();

        let summary = interactor().stamp_all(dir.path(), Some(24.0)).unwrap();
        assert_eq!(summary.stamped.len(), 1);
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].0.ends_with("b.avs"));
    }
}
