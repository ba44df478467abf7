//! Embedded chapter annotation (`##!! <Intro[0:2157], Part A[2158:17000]>`)

use serde::Serialize;

use crate::domain::model::{FrameRange, TimedSegment};
use crate::error::{ChapterError, ChapterResult};
use crate::script::ANNOTATION_MARKER;

/// Hand-annotated chapter names with their frame ranges, in script order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterAnnotation {
    pub names: Vec<String>,
    pub frames: Vec<FrameRange>,
}

impl ChapterAnnotation {
    /// Collect every annotation line and parse its entries.
    ///
    /// Returns `Ok(None)` when the script carries no annotation. Any entry
    /// that is not `name[start:end]` fails the whole parse.
    pub fn parse(lines: &[String]) -> ChapterResult<Option<Self>> {
        let fragments: Vec<&str> = lines
            .iter()
            .filter(|line| line.contains('<') && line.contains('>'))
            .filter_map(|line| line.strip_prefix(ANNOTATION_MARKER))
            .collect();

        if fragments.is_empty() {
            return Ok(None);
        }

        let mut annotation = Self {
            names: Vec::new(),
            frames: Vec::new(),
        };

        for entry in fragments.join(",").split(',') {
            let entry = entry.trim_matches(|c: char| c == '<' || c == '>' || c.is_whitespace());
            if entry.is_empty() {
                continue;
            }

            let (name, range) = parse_entry(entry)?;
            annotation.names.push(name);
            annotation.frames.push(range);
        }

        if annotation.names.is_empty() {
            return Ok(None);
        }

        Ok(Some(annotation))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Frame ranges converted to seconds at `frame_rate`
    pub fn segments(&self, frame_rate: f64) -> ChapterResult<Vec<TimedSegment>> {
        self.frames
            .iter()
            .map(|range| range.to_segment(frame_rate))
            .collect()
    }
}

fn parse_entry(entry: &str) -> ChapterResult<(String, FrameRange)> {
    let malformed = || ChapterError::MalformedAnnotation {
        entry: entry.to_string(),
    };

    let (name, rest) = entry.split_once('[').ok_or_else(malformed)?;
    let (start, rest) = rest.split_once(':').ok_or_else(malformed)?;
    let (end, trailing) = rest.split_once(']').ok_or_else(malformed)?;

    let name = name.trim();
    if name.is_empty() || !trailing.trim().is_empty() {
        return Err(malformed());
    }

    let start: u64 = start.trim().parse().map_err(|_| malformed())?;
    let end: u64 = end.trim().parse().map_err(|_| malformed())?;

    Ok((name.to_string(), FrameRange::new(start, end)))
}
