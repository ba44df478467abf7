//! Chapter naming: turns ordered segments into a named chapter layout

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chapters::layout::{layout_for, LayoutInput, SegmentShape};
use crate::domain::model::{ChapterAsset, NamedOrder, TimedSegment};
use crate::error::{ensure_frame_rate, ChapterError, ChapterResult};
use crate::utils::time::round_millis;

/// Thresholds steering layout selection, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingPolicy {
    /// Boundary gap (or leading offset) large enough to have held an
    /// opening or ending that was cut out
    pub gap_threshold: f64,
    /// Longest first segment still treated as a cold-open intro
    pub intro_max_duration: f64,
    /// Pull segment ends back by whole frames before naming
    pub smooth_boundaries: bool,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            gap_threshold: 50.0,
            intro_max_duration: 600.0,
            smooth_boundaries: false,
        }
    }
}

/// Selects and applies the layout for a set of segments
#[derive(Debug, Clone, Default)]
pub struct ChapterNamer {
    policy: NamingPolicy,
}

impl ChapterNamer {
    pub fn new(policy: NamingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &NamingPolicy {
        &self.policy
    }

    /// Name and order the segments.
    ///
    /// `fixed_names` must hold exactly one name per segment. An empty
    /// result means no layout rule covers this combination.
    pub fn name(
        &self,
        times: &[TimedSegment],
        opening: Option<&ChapterAsset>,
        ending: Option<&ChapterAsset>,
        fixed_names: Option<&[String]>,
    ) -> ChapterResult<NamedOrder> {
        if let Some(names) = fixed_names {
            if names.len() != times.len() {
                return Err(ChapterError::FixedNameCountMismatch {
                    names: names.len(),
                    segments: times.len(),
                });
            }
        }

        let input = LayoutInput {
            times,
            opening,
            ending,
            fixed_names,
            policy: &self.policy,
        };
        let shape = SegmentShape::of(&input);

        let Some(layout) = layout_for(shape) else {
            warn!(?shape, "No chapter layout rule for this combination");
            return Ok(NamedOrder::new());
        };

        let order = layout(&input);
        if order.is_empty() {
            warn!(?shape, "Chapter layout rule produced no chapters");
        } else {
            info!(?shape, names = ?order.names(), "Chapter layout selected");
        }

        Ok(order)
    }
}

/// Pull segment ends back ahead of large gaps.
///
/// Each segment followed by a gap of at least 5 seconds loses
/// `applied / frame_rate` from its end, `applied` starting at one frame and
/// growing by one after every adjustment. The last segment and a first
/// segment ending before the ten minute mark are left alone.
pub fn smooth_boundaries(times: &[TimedSegment], frame_rate: f64) -> ChapterResult<Vec<TimedSegment>> {
    const CONTIGUOUS_GAP: f64 = 5.0;
    const SHORT_FIRST_END: f64 = 600.0;

    let frame_rate = ensure_frame_rate(frame_rate)?;
    let mut applied = 1.0;
    let mut carried = 0.0;
    let mut smoothed = Vec::with_capacity(times.len());

    for (index, segment) in times.iter().enumerate() {
        let next_is_contiguous = times
            .get(index + 1)
            .is_some_and(|next| segment.gap_to(next) < CONTIGUOUS_GAP);
        let is_last = index + 1 == times.len();

        let mut offset = round_millis(applied / frame_rate);
        if is_last || next_is_contiguous || (index == 0 && segment.end < SHORT_FIRST_END) {
            offset = 0.0;
        }
        if offset > 0.0 {
            applied += 1.0;
        }

        let adjusted = TimedSegment::new(segment.start - carried, segment.end - offset);
        carried = if next_is_contiguous {
            segment.end - adjusted.end
        } else {
            0.0
        };

        smoothed.push(adjusted);
    }

    debug!(original = ?times, smoothed = ?smoothed, "Smoothed segment boundaries");
    Ok(smoothed)
}
