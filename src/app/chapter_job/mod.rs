// Chapter job - Orchestrates script parsing, naming, reconstruction and rendering

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};
use walkdir::WalkDir;

use crate::chapters::namer::smooth_boundaries;
use crate::chapters::{ChapterDocument, ChapterDocumentBuilder, ChapterNamer, TimelineReconstructor};
use crate::config::{AppConfig, EpisodeOverride, EpisodeOverrides};
use crate::domain::model::ChapterAsset;
use crate::error::{ensure_frame_rate, ChapterError, ChapterResult};
use crate::probe::MediaProbe;
use crate::script::{ScriptCommands, ScriptDocument, SCRIPT_EXTENSION};
use crate::trim::extract_trims;

/// Inputs for one chapter run
#[derive(Debug, Clone, Default)]
pub struct ChapterRequest {
    pub script: PathBuf,
    /// Takes precedence over the script directive and the probe
    pub frame_rate: Option<f64>,
    pub opening: Option<PathBuf>,
    pub ending: Option<PathBuf>,
    /// Defaults to `<script stem><output_suffix>` beside the script
    pub output: Option<PathBuf>,
    /// Build the document without writing it
    pub dry_run: bool,
}

impl ChapterRequest {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }
}

/// Result of one chapter run
#[derive(Debug, Clone)]
pub struct ChapterOutcome {
    pub script: PathBuf,
    pub output: PathBuf,
    pub frame_rate: f64,
    pub document: ChapterDocument,
    pub written: bool,
}

/// Result of a directory run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<ChapterOutcome>,
    pub failures: Vec<(PathBuf, ChapterError)>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Runs the full chapter pipeline for scripts
pub struct ChapterJob {
    probe: Arc<dyn MediaProbe>,
    config: AppConfig,
    overrides: EpisodeOverrides,
    uid_seed: Option<u64>,
}

impl ChapterJob {
    pub fn new(probe: Arc<dyn MediaProbe>, config: AppConfig) -> Self {
        Self {
            probe,
            config,
            overrides: EpisodeOverrides::default(),
            uid_seed: None,
        }
    }

    pub fn with_overrides(mut self, overrides: EpisodeOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Fix chapter UIDs, for reproducible output
    pub fn with_uid_seed(mut self, seed: u64) -> Self {
        self.uid_seed = Some(seed);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Process one script
    pub fn run(&self, request: &ChapterRequest) -> ChapterResult<ChapterOutcome> {
        info!(script = %request.script.display(), "Building chapters");

        let script = ScriptDocument::from_path(&request.script)?;
        let commands = script.commands()?;
        let frame_rate = resolve_frame_rate(self.probe.as_ref(), &script, &commands, request.frame_rate)?;
        let episode = self.overrides.for_script(script.path());

        let cuts = extract_trims(script.lines(), frame_rate)?;
        let (mut times, fixed_names) = match commands.annotation() {
            Some(annotation) => {
                info!(names = ?annotation.names, "Using chapter annotation");
                (annotation.segments(frame_rate)?, Some(annotation.names.clone()))
            }
            None => (cuts.times.clone(), None),
        };
        let fixed_names = episode.and_then(EpisodeOverride::fixed_names).or(fixed_names);

        if self.config.naming.smooth_boundaries {
            times = smooth_boundaries(&times, frame_rate)?;
        }

        let opening = self.load_asset(&script, request.opening.as_deref(), episode.and_then(|e| e.op.as_deref()))?;
        let ending = self.load_asset(&script, request.ending.as_deref(), episode.and_then(|e| e.ed.as_deref()))?;

        let namer = ChapterNamer::new(self.config.naming.clone());
        let order = namer.name(&times, opening.as_ref(), ending.as_ref(), fixed_names.as_deref())?;
        if order.is_empty() {
            return Err(ChapterError::UnsupportedChapterLayout {
                segments: times.len(),
                has_opening: opening.is_some(),
                has_ending: ending.is_some(),
                has_fixed_names: fixed_names.is_some(),
            });
        }

        let timings = TimelineReconstructor::new(frame_rate)?.reconstruct(&order);
        let document = self.document_builder().build(&timings)?;

        let output = request
            .output
            .clone()
            .unwrap_or_else(|| chapter_path(&request.script, &self.config.document.output_suffix));

        if request.dry_run {
            info!(output = %output.display(), "Dry run, chapter file not written");
        } else {
            document.write_to(&output)?;
        }

        Ok(ChapterOutcome {
            script: request.script.clone(),
            output,
            frame_rate,
            document,
            written: !request.dry_run,
        })
    }

    /// Process every script under `root`; `template` supplies the shared
    /// options and its script and output paths are ignored
    pub fn run_batch(&self, root: &Path, template: &ChapterRequest) -> ChapterResult<BatchSummary> {
        let scripts = find_scripts(root)?;
        info!(root = %root.display(), scripts = scripts.len(), "Processing script directory");

        let mut summary = BatchSummary::default();
        for script in scripts {
            let request = ChapterRequest {
                script: script.clone(),
                output: None,
                ..template.clone()
            };

            match self.run(&request) {
                Ok(outcome) => summary.outcomes.push(outcome),
                Err(e) => {
                    error!(script = %script.display(), error = %e, "Chapter creation failed");
                    summary.failures.push((script, e));
                }
            }
        }

        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Batch finished"
        );
        Ok(summary)
    }

    fn document_builder(&self) -> ChapterDocumentBuilder {
        let document = &self.config.document;
        let builder = ChapterDocumentBuilder::new()
            .edition_default(document.edition_default)
            .language(document.language.clone())
            .country(document.country.clone());

        match self.uid_seed {
            Some(seed) => builder.uid_seed(seed),
            None => builder,
        }
    }

    /// Command line asset first, then the episode override, which is
    /// resolved relative to the script
    fn load_asset(
        &self,
        script: &ScriptDocument,
        explicit: Option<&Path>,
        configured: Option<&Path>,
    ) -> ChapterResult<Option<ChapterAsset>> {
        let path = match (explicit, configured) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => script.directory().join(path),
            (None, None) => return Ok(None),
        };

        self.probe.asset(&path).map(Some)
    }
}

/// Media file the script decodes: the `input` directive relative to the
/// script directory, else the decoder call's argument
pub fn resolve_source_path(script: &ScriptDocument, commands: &ScriptCommands) -> ChapterResult<PathBuf> {
    let source = match commands.input() {
        Some(input) => input.to_string(),
        None => script.source()?,
    };
    Ok(script.directory().join(source))
}

/// Explicit value, then the `frame_rate` directive, then the probe
pub fn resolve_frame_rate(
    probe: &dyn MediaProbe,
    script: &ScriptDocument,
    commands: &ScriptCommands,
    explicit: Option<f64>,
) -> ChapterResult<f64> {
    if let Some(frame_rate) = explicit {
        return ensure_frame_rate(frame_rate);
    }

    if let Some(frame_rate) = commands.frame_rate()? {
        info!(frame_rate, "Frame rate taken from script directive");
        return Ok(frame_rate);
    }

    let source = resolve_source_path(script, commands)?;
    info!(source = %source.display(), "No frame rate directive, probing source");
    probe.frame_rate(&source)
}

/// `<dir>/<stem><suffix>` for a script path
pub fn chapter_path(script: &Path, suffix: &str) -> PathBuf {
    let stem = script
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    script.with_file_name(format!("{}{}", stem, suffix))
}

/// Every `.avs` script under `root`, sorted by path
pub fn find_scripts(root: &Path) -> ChapterResult<Vec<PathBuf>> {
    let mut scripts = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| ChapterError::Io(e.into()))?;

        let is_script = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SCRIPT_EXTENSION));
        if is_script {
            scripts.push(entry.into_path());
        }
    }
    Ok(scripts)
}
