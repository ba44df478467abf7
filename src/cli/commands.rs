//! Command implementations

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;

use crate::app::chapter_job::{resolve_frame_rate, resolve_source_path};
use crate::app::{ChapterJob, ChapterOutcome, ChapterRequest, StampInteractor, StampOutcome};
use crate::cli::args::{ChaptersArgs, SourceArgs, StampArgs, TrimsArgs};
use crate::config::{AppConfig, EpisodeOverrides};
use crate::probe::MediaProbe;
use crate::script::{ChapterAnnotation, ScriptDocument};
use crate::trim::{extract_trims, TrimCuts};
use crate::utils::time::format_timestamp;

/// Execute the chapters command
pub fn chapters(args: ChaptersArgs, config: AppConfig, probe: Arc<dyn MediaProbe>) -> Result<()> {
    info!(path = %args.path.display(), "Starting chapters operation");

    let mut job = ChapterJob::new(probe, config);
    if let Some(names_config) = &args.names_config {
        let overrides = EpisodeOverrides::from_path(names_config)
            .with_context(|| format!("Failed to load names config {}", names_config.display()))?;
        job = job.with_overrides(overrides);
    }

    let request = ChapterRequest {
        script: args.path.clone(),
        frame_rate: args.fps,
        opening: args.op,
        ending: args.ed,
        output: args.output,
        dry_run: args.dry_run,
    };

    if args.path.is_dir() {
        if request.output.is_some() {
            bail!("--output cannot be used with a directory");
        }

        let summary = job
            .run_batch(&args.path, &request)
            .with_context(|| format!("Failed to scan {}", args.path.display()))?;
        for outcome in &summary.outcomes {
            report_outcome(outcome);
        }
        for (script, e) in &summary.failures {
            eprintln!("Failed: {}: {}", script.display(), e);
        }

        if summary.failed() > 0 {
            bail!(
                "{} of {} scripts failed",
                summary.failed(),
                summary.failed() + summary.succeeded()
            );
        }
        return Ok(());
    }

    let outcome = job
        .run(&request)
        .with_context(|| format!("Failed to build chapters for {}", args.path.display()))?;
    report_outcome(&outcome);

    info!("Chapters operation completed successfully");
    Ok(())
}

fn report_outcome(outcome: &ChapterOutcome) {
    if outcome.written {
        println!("Chapter file written: {}", outcome.output.display());
    } else {
        println!("{}", outcome.document.to_xml());
    }
}

#[derive(Serialize)]
struct TrimReport<'a> {
    script: &'a Path,
    frame_rate: f64,
    #[serde(flatten)]
    cuts: &'a TrimCuts,
}

/// Execute the trims command
pub fn trims(args: TrimsArgs, probe: Arc<dyn MediaProbe>) -> Result<()> {
    let script = ScriptDocument::from_path(&args.script)?;
    let commands = script
        .commands()
        .with_context(|| format!("Failed to parse directives in {}", args.script.display()))?;
    let frame_rate = resolve_frame_rate(probe.as_ref(), &script, &commands, args.fps)
        .context("Failed to determine frame rate")?;
    let cuts = extract_trims(script.lines(), frame_rate)
        .with_context(|| format!("Failed to extract trims from {}", args.script.display()))?;

    if args.json {
        let report = TrimReport {
            script: &args.script,
            frame_rate,
            cuts: &cuts,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize trims to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    println!("Script: {}", args.script.display());
    println!("Frame rate: {:.3}", frame_rate);
    println!("Trims: {}", cuts.len());
    for (index, (frames, times)) in cuts.frames.iter().zip(&cuts.times).enumerate() {
        println!(
            "  [{:02}] {} -> {} - {}",
            index + 1,
            frames,
            format_timestamp(times.start),
            format_timestamp(times.end)
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct SourceReport<'a> {
    script: &'a Path,
    source: String,
    resolved: String,
    variables: BTreeMap<String, String>,
    commands: &'a BTreeMap<String, String>,
    annotation: Option<&'a ChapterAnnotation>,
}

/// Execute the source command
pub fn source(args: SourceArgs) -> Result<()> {
    let script = ScriptDocument::from_path(&args.script)?;
    let commands = script
        .commands()
        .with_context(|| format!("Failed to parse directives in {}", args.script.display()))?;
    let resolved = resolve_source_path(&script, &commands)
        .with_context(|| format!("Failed to resolve source of {}", args.script.display()))?;

    let source = match commands.input() {
        Some(input) => input.to_string(),
        None => script.source()?,
    };

    let report = SourceReport {
        script: &args.script,
        source,
        resolved: resolved.display().to_string(),
        variables: script.variables(),
        commands: commands.entries(),
        annotation: commands.annotation(),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize source to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    println!("Script: {}", report.script.display());
    println!("Source: {}", report.source);
    println!("Resolved: {}", report.resolved);
    if !report.variables.is_empty() {
        println!("Variables:");
        for (name, value) in &report.variables {
            println!("  {} = {}", name, value);
        }
    }
    if !report.commands.is_empty() {
        println!("Commands:");
        for (key, value) in report.commands {
            println!("  {} = {}", key, value);
        }
    }
    if let Some(annotation) = report.annotation {
        println!("Chapters:");
        for (name, frames) in annotation.names.iter().zip(&annotation.frames) {
            println!("  {} {}", name, frames);
        }
    }
    Ok(())
}

/// Execute the stamp-fps command
pub fn stamp_fps(args: StampArgs, probe: Arc<dyn MediaProbe>) -> Result<()> {
    let interactor = StampInteractor::new(probe);

    if args.path.is_dir() {
        let summary = interactor
            .stamp_all(&args.path, args.fps)
            .with_context(|| format!("Failed to scan {}", args.path.display()))?;
        for (script, outcome) in &summary.stamped {
            report_stamp(script, outcome);
        }
        for (script, e) in &summary.failures {
            eprintln!("Failed: {}: {}", script.display(), e);
        }

        if !summary.failures.is_empty() {
            bail!("{} scripts could not be stamped", summary.failures.len());
        }
        return Ok(());
    }

    let outcome = interactor
        .stamp(&args.path, args.fps)
        .with_context(|| format!("Failed to stamp {}", args.path.display()))?;
    report_stamp(&args.path, &outcome);
    Ok(())
}

fn report_stamp(script: &Path, outcome: &StampOutcome) {
    match outcome {
        StampOutcome::Stamped(frame_rate) => {
            println!("Frame rate added: {} ({:.3})", script.display(), frame_rate)
        }
        StampOutcome::AlreadyStamped(frame_rate) => {
            println!("Already stamped: {} ({:.3})", script.display(), frame_rate)
        }
    }
}
