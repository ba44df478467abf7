//! Custom directives embedded as `##>key=value` comments

use std::collections::BTreeMap;

use crate::error::{ensure_frame_rate, ChapterError, ChapterResult};
use crate::script::annotation::ChapterAnnotation;
use crate::script::COMMAND_MARKER;

/// Directive key overriding the probed frame rate
pub const FRAME_RATE_KEY: &str = "frame_rate";
/// Directive key naming the source file relative to the script
pub const INPUT_KEY: &str = "input";

/// Directives parsed from a script's comment lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptCommands {
    entries: BTreeMap<String, String>,
    annotation: Option<ChapterAnnotation>,
}

impl ScriptCommands {
    /// Parse every `##>` line plus the `##!!` chapter annotation.
    ///
    /// Directive lines are comma-joined and split into `key=value` pairs;
    /// fragments shorter than three characters are skipped.
    pub fn parse(lines: &[String]) -> ChapterResult<Self> {
        let joined = lines
            .iter()
            .filter_map(|line| line.strip_prefix(COMMAND_MARKER))
            .map(|rest| rest.trim_matches(|c: char| c == '#' || c == '>').trim())
            .collect::<Vec<_>>()
            .join(",");

        let mut entries = BTreeMap::new();
        for fragment in joined.split(',') {
            let fragment = fragment.trim();
            if fragment.len() < 3 {
                continue;
            }

            let parts: Vec<&str> = fragment.split('=').collect();
            let [key, value] = parts.as_slice() else {
                return Err(ChapterError::MalformedCommand {
                    fragment: fragment.to_string(),
                });
            };

            entries.insert(key.trim().to_string(), value.trim().to_string());
        }

        Ok(Self {
            entries,
            annotation: ChapterAnnotation::parse(lines)?,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Source file override, relative to the script directory
    pub fn input(&self) -> Option<&str> {
        self.get(INPUT_KEY)
    }

    /// Frame rate override, validated to be positive
    pub fn frame_rate(&self) -> ChapterResult<Option<f64>> {
        let Some(raw) = self.get(FRAME_RATE_KEY) else {
            return Ok(None);
        };

        let frame_rate: f64 = raw.parse().map_err(|_| ChapterError::InvalidCommandValue {
            key: FRAME_RATE_KEY.to_string(),
            value: raw.to_string(),
        })?;

        ensure_frame_rate(frame_rate).map(Some)
    }

    pub fn annotation(&self) -> Option<&ChapterAnnotation> {
        self.annotation.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_commands() {
        let script = lines("##>frame_rate=23.976\n##>input=raw/ep01.mkv, x=1\nFFVideoSource(\"a.mkv\")");
        let commands = ScriptCommands::parse(&script).unwrap();

        assert_eq!(commands.get("frame_rate"), Some("23.976"));
        assert_eq!(commands.input(), Some("raw/ep01.mkv"));
        assert_eq!(commands.get("x"), Some("1"));
        assert_eq!(commands.frame_rate().unwrap(), Some(23.976));
        assert!(commands.annotation().is_none());
    }

    #[test]
    fn test_short_fragments_are_skipped() {
        let script = lines("##>a,,frame_rate=25\n##>");
        let commands = ScriptCommands::parse(&script).unwrap();
        assert_eq!(commands.entries().len(), 1);
        assert_eq!(commands.frame_rate().unwrap(), Some(25.0));
    }

    #[test]
    fn test_malformed_fragment_fails() {
        let script = lines("##>frame_rate");
        assert!(matches!(
            ScriptCommands::parse(&script),
            Err(ChapterError::MalformedCommand { .. })
        ));
    }

    #[test]
    fn test_invalid_frame_rate_values() {
        let commands = ScriptCommands::parse(&lines("##>frame_rate=fast")).unwrap();
        assert!(matches!(
            commands.frame_rate(),
            Err(ChapterError::InvalidCommandValue { .. })
        ));

        let commands = ScriptCommands::parse(&lines("##>frame_rate=0")).unwrap();
        assert!(matches!(
            commands.frame_rate(),
            Err(ChapterError::InvalidFrameRate { .. })
        ));
    }

    #[test]
    fn test_annotation_is_attached() {
        let script = lines("##>frame_rate=24\n##!! <Episode[0:240]>");
        let commands = ScriptCommands::parse(&script).unwrap();
        let annotation = commands.annotation().unwrap();
        assert_eq!(annotation.names, vec!["Episode"]);
    }

    #[test]
    fn test_annotation_line_is_not_a_command() {
        let script = lines("##!! <Episode[0:240]>");
        let commands = ScriptCommands::parse(&script).unwrap();
        assert!(commands.entries().is_empty());
    }
}
