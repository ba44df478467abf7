//! Timeline reconstruction
//!
//! Rewrites each segment so it follows the previous one on the output
//! timeline: contiguous cuts are spliced with no gap, everything else is
//! pushed one or two frames past the previous end. Assets keep their own
//! zero-based span and never move the running timestamp.

use serde::Serialize;
use tracing::debug;

use crate::domain::model::{NamedOrder, OrderEntry, TimedSegment};
use crate::error::{ensure_frame_rate, ChapterResult};
use crate::utils::time::format_timestamp;

/// Largest boundary gap, in seconds, still spliced without a frame gap
pub const CONTINUITY_TOLERANCE: f64 = 1.0;

/// Whether `current` continues `previous` without a real cut between them
pub fn is_continuous(previous: &TimedSegment, current: &TimedSegment) -> bool {
    (previous.end - current.start).abs() <= CONTINUITY_TOLERANCE
}

/// A chapter with its final timeline position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterTiming {
    pub name: String,
    /// `H:MM:SS.mmm`
    pub start: String,
    /// `H:MM:SS.mmm`, or the asset's own duration string
    pub end: String,
    /// Set only for spliced assets
    pub segment_uid: Option<String>,
    /// Reconstructed span in seconds; `None` for assets
    pub span: Option<TimedSegment>,
}

/// Walks a named layout and produces contiguous chapter timings
#[derive(Debug, Clone, Copy)]
pub struct TimelineReconstructor {
    frame_rate: f64,
}

impl TimelineReconstructor {
    pub fn new(frame_rate: f64) -> ChapterResult<Self> {
        Ok(Self {
            frame_rate: ensure_frame_rate(frame_rate)?,
        })
    }

    /// Frames inserted before a discontinuous segment at `index`
    fn splice_frames(index: usize) -> f64 {
        if index <= 2 {
            1.0
        } else {
            2.0
        }
    }

    pub fn reconstruct(&self, order: &NamedOrder) -> Vec<ChapterTiming> {
        let entries = order.entries();
        let mut last_timestamp: Option<f64> = None;
        let mut timings = Vec::with_capacity(entries.len());

        for (index, named) in entries.iter().enumerate() {
            let current = match &named.entry {
                OrderEntry::Asset(_, asset) => {
                    timings.push(ChapterTiming {
                        name: named.name.clone(),
                        start: format_timestamp(0.0),
                        end: asset.duration.clone(),
                        segment_uid: Some(asset.segment_uid.clone()),
                        span: None,
                    });
                    continue;
                }
                OrderEntry::Segment(segment) => TimedSegment::new(segment.start, segment.end),
            };

            let previous = index
                .checked_sub(1)
                .and_then(|i| entries[i].entry.as_segment());
            let continuity_offset = previous
                .filter(|previous| is_continuous(previous, &current))
                .map(|previous| current.start - previous.end);

            let span = match last_timestamp {
                None => current,
                Some(last) => {
                    let duration = current.duration();
                    match continuity_offset {
                        Some(offset) => TimedSegment::new(last, last + duration + offset),
                        None => {
                            let start = last + Self::splice_frames(index) / self.frame_rate;
                            TimedSegment::new(start, start + duration)
                        }
                    }
                }
            };

            debug!(
                chapter = %named.name,
                original = %current,
                reconstructed = %span,
                continuous = continuity_offset.is_some(),
                "Reconstructed chapter timing"
            );

            last_timestamp = Some(span.end);
            timings.push(ChapterTiming {
                name: named.name.clone(),
                start: format_timestamp(span.start),
                end: format_timestamp(span.end),
                segment_uid: None,
                span: Some(span),
            });
        }

        timings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AssetRole, ChapterAsset};

    fn seg(start: f64, end: f64) -> TimedSegment {
        TimedSegment::new(start, end)
    }

    #[test]
    fn test_continuity_detection() {
        assert!(is_continuous(&seg(0.0, 100.0), &seg(100.5, 200.0)));
        assert!(is_continuous(&seg(0.0, 100.0), &seg(101.0, 200.0)));
        assert!(!is_continuous(&seg(0.0, 100.0), &seg(102.0, 200.0)));
    }

    #[test]
    fn test_rejects_bad_frame_rate() {
        assert!(TimelineReconstructor::new(0.0).is_err());
        assert!(TimelineReconstructor::new(-23.976).is_err());
        assert!(TimelineReconstructor::new(f64::NAN).is_err());
    }

    #[test]
    fn test_first_segment_is_rendered_raw() {
        let mut order = NamedOrder::new();
        order.push_segment("Episode", seg(12.5, 600.25));

        let timings = TimelineReconstructor::new(25.0).unwrap().reconstruct(&order);
        assert_eq!(timings[0].start, "0:00:12.500");
        assert_eq!(timings[0].end, "0:10:00.250");
    }

    #[test]
    fn test_discontinuous_segments_get_frame_gap() {
        let mut order = NamedOrder::new();
        order.push_segment("Intro", seg(0.0, 90.0));
        order.push_segment("Episode", seg(180.0, 1300.0));
        order.push_segment("Outro", seg(1390.0, 1420.0));
        order.push_segment("Preview", seg(1500.0, 1530.0));

        let timings = TimelineReconstructor::new(25.0).unwrap().reconstruct(&order);
        let spans: Vec<_> = timings.iter().map(|t| t.span.unwrap()).collect();

        assert_eq!(spans[0], seg(0.0, 90.0));
        assert_eq!(spans[1], seg(90.04, 1210.04));
        assert_eq!(spans[2], seg(1210.08, 1240.08));
        // Two frames from the fourth entry on
        assert_eq!(spans[3], seg(1240.16, 1270.16));
        assert_eq!(timings[1].start, "0:01:30.040");
    }

    #[test]
    fn test_continuous_segments_share_boundary() {
        let mut order = NamedOrder::new();
        order.push_segment("A", seg(0.0, 100.0));
        order.push_segment("B", seg(100.5, 200.0));

        let timings = TimelineReconstructor::new(24.0).unwrap().reconstruct(&order);
        let spans: Vec<_> = timings.iter().map(|t| t.span.unwrap()).collect();

        assert_eq!(spans[1].start, spans[0].end);
        assert_eq!(spans[1], seg(100.0, 200.0));
        assert_eq!(timings[1].start, timings[0].end);
    }

    #[test]
    fn test_assets_are_not_retimed() {
        let opening = ChapterAsset::new("00:01:30.048", "00000000000000000000000000ABCDEF");
        let mut order = NamedOrder::new();
        order.push_segment("Intro", seg(0.0, 90.0));
        order.push_asset(AssetRole::Opening, &opening);
        order.push_segment("Episode", seg(90.5, 1300.0));

        let timings = TimelineReconstructor::new(25.0).unwrap().reconstruct(&order);

        assert_eq!(timings[1].start, "0:00:00.000");
        assert_eq!(timings[1].end, "00:01:30.048");
        assert_eq!(timings[1].segment_uid.as_deref(), Some("00000000000000000000000000ABCDEF"));
        assert!(timings[1].span.is_none());

        // Previous entry is an asset, so the episode is discontinuous
        let episode = timings[2].span.unwrap();
        assert_eq!(episode, seg(90.04, 1299.54));
        assert!(episode.start > timings[0].span.unwrap().end);
    }

    #[test]
    fn test_asset_first_then_segment_is_raw() {
        let opening = ChapterAsset::new("00:01:30.048", "AB");
        let mut order = NamedOrder::new();
        order.push_asset(AssetRole::Opening, &opening);
        order.push_segment("Episode", seg(0.0, 1310.0));

        let timings = TimelineReconstructor::new(23.976).unwrap().reconstruct(&order);
        assert_eq!(timings[1].start, "0:00:00.000");
        assert_eq!(timings[1].end, "0:21:50.000");
    }

    #[test]
    fn test_reconstruction_is_monotonic() {
        let mut order = NamedOrder::new();
        for i in 0..8 {
            let start = i as f64 * 300.0 + if i % 2 == 0 { 0.0 } else { 0.4 };
            order.push_segment(format!("Part {i}"), seg(start, start + 250.0));
        }

        let timings = TimelineReconstructor::new(23.976).unwrap().reconstruct(&order);
        let spans: Vec<_> = timings.iter().map(|t| t.span.unwrap()).collect();

        for pair in spans.windows(2) {
            assert!(pair[0].end >= pair[0].start);
            assert!(pair[1].start > pair[0].end);
        }
    }
}
