//! Source descriptor resolution
//!
//! Recovers the file handed to the video decoder call, following simple
//! variable assignments and `variable + ".ext"` concatenation. Matching is
//! case-insensitive; keys, values and the resolved name are lower-cased.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{ChapterError, ChapterResult};

/// Token identifying a decoder call whose first argument is the source
const DECODER_TOKEN: &str = "source(";
/// Decoder lines that load audio only and never name the video source
const AUDIO_DECODER_TOKENS: &[&str] = &["ffaudio", "audiosource("];
/// Extensions that mark a resolved name as complete
const VIDEO_EXTENSIONS: &[&str] = &[".mkv", ".mp4", ".ts"];

/// Split a lower-cased line into `(name, value)` when it holds exactly one `=`
fn parse_assignment(line: &str) -> Option<(String, String)> {
    let tokens: Vec<&str> = line.split('=').map(|token| token.trim_matches(' ')).collect();
    match tokens.as_slice() {
        [name, value] => Some((name.to_string(), value.to_string())),
        _ => None,
    }
}

/// All variable assignments in the script, later assignments winning.
/// Comment lines, directives included, never define variables.
pub fn defined_variables(lines: &[String]) -> BTreeMap<String, String> {
    lines
        .iter()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| parse_assignment(&line.to_lowercase()))
        .collect()
}

fn is_video_decoder_line(line: &str) -> bool {
    line.contains(DECODER_TOKEN) && !AUDIO_DECODER_TOKENS.iter().any(|token| line.contains(token))
}

/// First argument of the decoder call, e.g. `src + ".mkv"`
fn decoder_argument(line: &str) -> &str {
    line.split_once(DECODER_TOKEN)
        .map(|(_, rest)| rest)
        .unwrap_or_default()
        .split(',')
        .next()
        .unwrap_or_default()
        .trim_matches(')')
        .trim()
}

fn resolve_argument(
    argument: &str,
    defined: &BTreeMap<String, String>,
    file: &str,
    line_number: usize,
    line: &str,
) -> ChapterResult<String> {
    let concatenated =
        argument.contains('+') && argument.contains('"') && !argument.starts_with('"');
    let variable = if concatenated {
        argument.split('+').next().unwrap_or_default().trim()
    } else {
        argument
    };

    let mut filename = if let Some(value) = defined.get(variable) {
        value.replace('"', "")
    } else if variable.len() >= 2 && variable.starts_with('"') && variable.ends_with('"') {
        variable.trim_matches('"').to_string()
    } else {
        return Err(ChapterError::UndefinedVariable {
            variable: variable.to_string(),
            file: file.to_string(),
            line: line_number,
            text: line.to_string(),
        });
    };

    if !VIDEO_EXTENSIONS.iter().any(|ext| filename.ends_with(ext)) {
        if let Some(extension) = argument.split('+').nth(1) {
            filename.push_str(extension.replace('"', "").trim());
        }
    }

    Ok(filename)
}

/// Resolve the video source named by the script.
///
/// Only assignments made before a decoder line are visible to it. When
/// several decoder lines exist the last one wins; comment lines are skipped.
/// `line` in [`ChapterError::UndefinedVariable`] is 1-based.
pub fn resolve_source(file: &str, lines: &[String]) -> ChapterResult<String> {
    let mut defined = BTreeMap::new();
    let mut resolved = None;

    for (index, raw) in lines.iter().enumerate() {
        let line = raw.to_lowercase();

        if let Some((name, value)) = parse_assignment(&line) {
            defined.insert(name, value);
        }

        if line.trim_start().starts_with('#') || !is_video_decoder_line(&line) {
            continue;
        }

        let argument = decoder_argument(&line);
        let filename = resolve_argument(argument, &defined, file, index + 1, &line)?;
        debug!(line = index + 1, argument, source = %filename, "Resolved decoder source");
        resolved = Some(filename);
    }

    resolved.ok_or_else(|| ChapterError::MissingSourceDescriptor {
        file: file.to_string(),
    })
}
