// Domain models - Segments, assets and chapter atoms

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_frame_rate, ChapterResult};
use crate::utils::time::{frames_to_seconds, round_millis};

/// Inclusive frame range taken from a trim directive or chapter annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: u64,
    pub end: u64,
}

impl FrameRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Convert to a timed segment at the given frame rate
    pub fn to_segment(&self, frame_rate: f64) -> ChapterResult<TimedSegment> {
        let frame_rate = ensure_frame_rate(frame_rate)?;
        Ok(TimedSegment {
            start: frames_to_seconds(self.start, frame_rate),
            end: frames_to_seconds(self.end, frame_rate),
        })
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

/// Time span of a trimmed segment in seconds, millisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedSegment {
    pub start: f64,
    pub end: f64,
}

impl TimedSegment {
    /// Create a segment, rounding both bounds to milliseconds
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: round_millis(start),
            end: round_millis(end),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Same segment moved earlier by `offset` seconds
    pub fn rebased(&self, offset: f64) -> Self {
        Self::new(self.start - offset, self.end - offset)
    }

    /// Gap between the end of this segment and the start of `next`
    pub fn gap_to(&self, next: &TimedSegment) -> f64 {
        next.start - self.end
    }
}

impl fmt::Display for TimedSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.start, self.end)
    }
}

/// Externally supplied opening or ending clip, spliced in by reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterAsset {
    /// Duration as reported by the media probe, e.g. `00:01:30.048`
    pub duration: String,
    /// Segment UID of the asset file as upper-case hex
    pub segment_uid: String,
}

impl ChapterAsset {
    pub fn new(duration: impl Into<String>, segment_uid: impl Into<String>) -> Self {
        Self {
            duration: duration.into(),
            segment_uid: segment_uid.into(),
        }
    }
}

/// Which slot an asset fills in the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetRole {
    Opening,
    Ending,
}

impl AssetRole {
    /// Chapter display name used when the asset is spliced in
    pub fn chapter_name(&self) -> &'static str {
        match self {
            AssetRole::Opening => "Opening",
            AssetRole::Ending => "Ending",
        }
    }
}

/// One slot of a chapter layout
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEntry {
    Segment(TimedSegment),
    Asset(AssetRole, ChapterAsset),
}

impl OrderEntry {
    pub fn as_segment(&self) -> Option<&TimedSegment> {
        match self {
            OrderEntry::Segment(segment) => Some(segment),
            OrderEntry::Asset(..) => None,
        }
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, OrderEntry::Asset(..))
    }
}

/// A chapter name paired with the slot it labels
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEntry {
    pub name: String,
    pub entry: OrderEntry,
}

/// Ordered chapter layout produced by the namer.
///
/// Names and slots are stored as pairs so the two sequences can never
/// drift apart in length. An empty layout means no rule covered the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedOrder {
    entries: Vec<NamedEntry>,
}

impl NamedOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, entry: OrderEntry) {
        self.entries.push(NamedEntry {
            name: name.into(),
            entry,
        });
    }

    pub fn push_segment(&mut self, name: impl Into<String>, segment: TimedSegment) {
        self.push(name, OrderEntry::Segment(segment));
    }

    pub fn push_asset(&mut self, role: AssetRole, asset: &ChapterAsset) {
        self.push(role.chapter_name(), OrderEntry::Asset(role, asset.clone()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[NamedEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn order(&self) -> Vec<&OrderEntry> {
        self.entries.iter().map(|e| &e.entry).collect()
    }

    /// True when any opening or ending asset takes part in the layout
    pub fn has_assets(&self) -> bool {
        self.entries.iter().any(|e| e.entry.is_asset())
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<OrderEntry>) {
        self.entries.into_iter().map(|e| (e.name, e.entry)).unzip()
    }
}

/// Render-ready chapter entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    pub uid: u64,
    pub start: String,
    pub end: String,
    pub name: String,
    pub hidden: bool,
    pub enabled: bool,
    pub segment_uid: Option<String>,
}

/// Edition flags for the chapter document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    pub default: bool,
    /// Set whenever an opening or ending asset is linked by segment UID
    pub ordered: bool,
    pub uid: u64,
}

#[cfg(test)]
mod tests;
