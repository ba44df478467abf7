//! Trim directive extraction
//!
//! Finds every `trim(start,end)` call outside comment lines and converts
//! the frame pairs to seconds.

use serde::Serialize;
use tracing::info;

use crate::domain::model::{FrameRange, TimedSegment};
use crate::error::{ensure_frame_rate, ChapterError, ChapterResult};

/// Operator chaining trims into one clip
pub const CONTINUATION_TOKEN: &str = "++";
const TRIM_TOKEN: &str = "trim(";

/// Trimmed frame ranges and their time equivalents, in script order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrimCuts {
    pub frames: Vec<FrameRange>,
    pub times: Vec<TimedSegment>,
}

impl TrimCuts {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Extract all trims from the script lines.
///
/// Lines starting with `#` are ignored. Whitespace is removed before the
/// chain is split on [`CONTINUATION_TOKEN`], so a chain may span lines.
pub fn extract_trims(lines: &[String], frame_rate: f64) -> ChapterResult<TrimCuts> {
    let frame_rate = ensure_frame_rate(frame_rate)?;

    let chain: String = lines
        .iter()
        .filter(|line| !line.trim_start().starts_with('#'))
        .map(|line| line.to_lowercase())
        .filter(|line| line.contains(TRIM_TOKEN))
        .flat_map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
        .collect();

    let mut cuts = TrimCuts::default();
    for fragment in chain.split(CONTINUATION_TOKEN) {
        if fragment.is_empty() {
            continue;
        }

        for range in parse_fragment(fragment)? {
            cuts.times.push(range.to_segment(frame_rate)?);
            cuts.frames.push(range);
        }
    }

    info!(frames = ?cuts.frames, "Trimmed frames");
    info!(timestamps = ?cuts.times, "Trimmed timestamps");
    Ok(cuts)
}

/// Every `trim(a,b)` call inside one chain fragment
fn parse_fragment(fragment: &str) -> ChapterResult<Vec<FrameRange>> {
    let malformed = || ChapterError::MalformedTrimDirective {
        fragment: fragment.to_string(),
    };

    fragment
        .match_indices(TRIM_TOKEN)
        .map(|(index, _)| {
            let arguments = &fragment[index + TRIM_TOKEN.len()..];
            let (arguments, _) = arguments.split_once(')').ok_or_else(malformed)?;

            let values: Vec<&str> = arguments.split(',').collect();
            let [start, end] = values.as_slice() else {
                return Err(malformed());
            };

            let start: u64 = start.parse().map_err(|_| malformed())?;
            let end: u64 = end.parse().map_err(|_| malformed())?;
            Ok(FrameRange::new(start, end))
        })
        .collect()
}
