//! Chapter layout table
//!
//! Every supported combination of segment count, asset presence and fixed
//! names maps to one pure layout function. Combinations without an entry
//! produce an empty layout, which callers treat as unsupported.

use crate::chapters::namer::NamingPolicy;
use crate::domain::model::{AssetRole, ChapterAsset, NamedOrder, TimedSegment};

/// Segment count as seen by the layout table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountBucket {
    Empty,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    /// Seven or more segments
    Many,
}

impl CountBucket {
    pub fn from_len(len: usize) -> Self {
        match len {
            0 => CountBucket::Empty,
            1 => CountBucket::One,
            2 => CountBucket::Two,
            3 => CountBucket::Three,
            4 => CountBucket::Four,
            5 => CountBucket::Five,
            6 => CountBucket::Six,
            _ => CountBucket::Many,
        }
    }
}

/// Key of the layout table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentShape {
    pub count: CountBucket,
    pub has_opening: bool,
    pub has_ending: bool,
    pub has_fixed_names: bool,
}

impl SegmentShape {
    pub fn of(input: &LayoutInput<'_>) -> Self {
        Self {
            count: CountBucket::from_len(input.times.len()),
            has_opening: input.opening.is_some(),
            has_ending: input.ending.is_some(),
            has_fixed_names: input.fixed_names.is_some(),
        }
    }
}

/// Everything a layout function may look at
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    pub times: &'a [TimedSegment],
    pub opening: Option<&'a ChapterAsset>,
    pub ending: Option<&'a ChapterAsset>,
    pub fixed_names: Option<&'a [String]>,
    pub policy: &'a NamingPolicy,
}

impl LayoutInput<'_> {
    /// Cold-open test: first segment starts at zero and is short
    fn starts_with_intro(&self) -> bool {
        self.times
            .first()
            .is_some_and(|t| t.start == 0.0 && t.duration() <= self.policy.intro_max_duration)
    }

    /// Name of a lone segment: the single fixed name, else "Episode"
    fn single_name(&self) -> String {
        self.fixed_names
            .and_then(|names| names.first())
            .cloned()
            .unwrap_or_else(|| "Episode".to_string())
    }

    fn segment(&self, index: usize) -> TimedSegment {
        self.times[index]
    }
}

pub type LayoutFn = fn(&LayoutInput<'_>) -> NamedOrder;

/// Look up the layout function for a shape
pub fn layout_for(shape: SegmentShape) -> Option<LayoutFn> {
    use CountBucket::*;

    let SegmentShape {
        count,
        has_opening,
        has_ending,
        has_fixed_names,
    } = shape;
    let has_asset = has_opening || has_ending;

    let layout: LayoutFn = match (count, has_opening, has_ending, has_fixed_names) {
        (Empty, ..) => return None,

        (One, true, true, _) => one_with_both,
        (One, true, false, _) => one_with_opening,
        (One, false, true, _) => one_with_ending,
        (One, false, false, _) => one_alone,

        (Two | Three | Four, _, _, true) if has_asset => splice_fixed,
        (Two | Three | Four | Five | Six, false, false, true) => fixed_verbatim,

        (Two, true, true, false) => two_with_both,
        (Two, true, false, false) => two_with_opening,
        (Two, false, true, false) => two_with_ending,
        (Two, false, false, false) => two_alone,

        (Three, true, true, false) => three_with_both,
        (Three, true, false, false) => three_with_opening,
        (Three, false, true, false) => three_with_ending,
        (Three, false, false, false) => three_alone,

        (Five | Six | Many, true, true, true) => splice_fixed,
        (Five, true, false, true) => five_opening_after_first,
        (Five, false, true, true) => splice_fixed,

        _ => return None,
    };

    Some(layout)
}

fn push_asset(order: &mut NamedOrder, role: AssetRole, asset: Option<&ChapterAsset>) {
    if let Some(asset) = asset {
        order.push_asset(role, asset);
    }
}

fn fixed_verbatim(input: &LayoutInput<'_>) -> NamedOrder {
    let mut order = NamedOrder::new();
    for (name, segment) in input.fixed_names.unwrap_or_default().iter().zip(input.times) {
        order.push_segment(name.clone(), *segment);
    }
    order
}

/// Fixed names in order with the assets spliced at large boundaries.
///
/// A first segment starting past the gap threshold gets the opening in
/// front of it, and every segment is re-based on that start. After that,
/// each boundary whose gap exceeds the threshold takes the opening while it
/// is still pending, otherwise the ending. An ending left over is appended
/// after the last segment; an opening left over has no place and yields an
/// empty layout.
fn splice_fixed(input: &LayoutInput<'_>) -> NamedOrder {
    let gap = input.policy.gap_threshold;
    let names = input.fixed_names.unwrap_or_default();

    let mut order = NamedOrder::new();
    let mut opening_pending = input.opening.is_some();
    let mut ending_pending = input.ending.is_some();

    let offset = match input.times.first() {
        Some(first) if opening_pending && first.start > gap => {
            push_asset(&mut order, AssetRole::Opening, input.opening);
            opening_pending = false;
            first.start
        }
        _ => 0.0,
    };

    for (index, (name, raw)) in names.iter().zip(input.times).enumerate() {
        order.push_segment(name.clone(), raw.rebased(offset));

        let Some(next) = input.times.get(index + 1) else {
            continue;
        };
        if raw.gap_to(next) <= gap {
            continue;
        }

        if opening_pending {
            push_asset(&mut order, AssetRole::Opening, input.opening);
            opening_pending = false;
        } else if ending_pending {
            push_asset(&mut order, AssetRole::Ending, input.ending);
            ending_pending = false;
        }
    }

    if opening_pending {
        return NamedOrder::new();
    }
    if ending_pending {
        push_asset(&mut order, AssetRole::Ending, input.ending);
    }

    order
}

/// The episode keeps its source start, it is not re-based on the opening
fn one_with_both(input: &LayoutInput<'_>) -> NamedOrder {
    let mut order = NamedOrder::new();
    push_asset(&mut order, AssetRole::Opening, input.opening);
    order.push_segment(input.single_name(), input.segment(0));
    push_asset(&mut order, AssetRole::Ending, input.ending);
    order
}

fn one_with_opening(input: &LayoutInput<'_>) -> NamedOrder {
    let episode = input.segment(0);
    let mut order = NamedOrder::new();
    push_asset(&mut order, AssetRole::Opening, input.opening);
    order.push_segment(input.single_name(), episode.rebased(episode.start));
    order
}

fn one_with_ending(input: &LayoutInput<'_>) -> NamedOrder {
    let mut order = NamedOrder::new();
    order.push_segment(input.single_name(), input.segment(0));
    push_asset(&mut order, AssetRole::Ending, input.ending);
    order
}

fn one_alone(input: &LayoutInput<'_>) -> NamedOrder {
    let mut order = NamedOrder::new();
    order.push_segment(input.single_name(), input.segment(0));
    order
}

fn two_with_both(input: &LayoutInput<'_>) -> NamedOrder {
    let (first, second) = (input.segment(0), input.segment(1));
    let mut order = NamedOrder::new();

    if input.starts_with_intro() {
        order.push_segment("Intro", first);
        push_asset(&mut order, AssetRole::Opening, input.opening);
        order.push_segment("Episode", second);
        push_asset(&mut order, AssetRole::Ending, input.ending);
    } else {
        let offset = first.start;
        push_asset(&mut order, AssetRole::Opening, input.opening);
        order.push_segment("Episode", first.rebased(offset));
        push_asset(&mut order, AssetRole::Ending, input.ending);
        order.push_segment("Preview", second.rebased(offset));
    }

    order
}

fn two_with_opening(input: &LayoutInput<'_>) -> NamedOrder {
    let (first, second) = (input.segment(0), input.segment(1));
    let mut order = NamedOrder::new();

    if input.starts_with_intro() {
        order.push_segment("Intro", first);
        push_asset(&mut order, AssetRole::Opening, input.opening);
        order.push_segment("Episode", second);
    } else if first.start == 0.0 {
        order.push_segment("Episode", first);
        push_asset(&mut order, AssetRole::Opening, input.opening);
        order.push_segment("Preview", second);
    } else {
        push_asset(&mut order, AssetRole::Opening, input.opening);
        order.push_segment("Episode", first);
        order.push_segment("Preview", second);
    }

    order
}

fn two_with_ending(input: &LayoutInput<'_>) -> NamedOrder {
    let (first, second) = (input.segment(0), input.segment(1));
    let mut order = NamedOrder::new();

    if input.starts_with_intro() {
        order.push_segment("Intro", first);
        order.push_segment("Episode", second);
        push_asset(&mut order, AssetRole::Ending, input.ending);
    } else {
        order.push_segment("Episode", first);
        push_asset(&mut order, AssetRole::Ending, input.ending);
        order.push_segment("Preview", second);
    }

    order
}

fn two_alone(input: &LayoutInput<'_>) -> NamedOrder {
    let names = if input.starts_with_intro() {
        ["Intro", "Episode"]
    } else {
        ["Episode", "Preview"]
    };

    let mut order = NamedOrder::new();
    for (name, segment) in names.into_iter().zip(input.times) {
        order.push_segment(name, *segment);
    }
    order
}

fn three_with_both(input: &LayoutInput<'_>) -> NamedOrder {
    let mut order = NamedOrder::new();
    order.push_segment("Intro", input.segment(0));
    push_asset(&mut order, AssetRole::Opening, input.opening);
    order.push_segment("Episode", input.segment(1));
    push_asset(&mut order, AssetRole::Ending, input.ending);
    order.push_segment("Outro", input.segment(2));
    order
}

fn three_with_opening(input: &LayoutInput<'_>) -> NamedOrder {
    let mut order = NamedOrder::new();
    order.push_segment("Intro", input.segment(0));
    push_asset(&mut order, AssetRole::Opening, input.opening);
    order.push_segment("Episode", input.segment(1));
    order.push_segment("Outro", input.segment(2));
    order
}

fn three_with_ending(input: &LayoutInput<'_>) -> NamedOrder {
    let mut order = NamedOrder::new();
    order.push_segment("Intro", input.segment(0));
    order.push_segment("Episode", input.segment(1));
    push_asset(&mut order, AssetRole::Ending, input.ending);
    order.push_segment("Outro", input.segment(2));
    order
}

fn three_alone(input: &LayoutInput<'_>) -> NamedOrder {
    let mut order = NamedOrder::new();
    for (name, segment) in ["Intro", "Episode", "Outro"].into_iter().zip(input.times) {
        order.push_segment(name, *segment);
    }
    order
}

/// Five annotated segments with an opening that follows the first one
fn five_opening_after_first(input: &LayoutInput<'_>) -> NamedOrder {
    let names = input.fixed_names.unwrap_or_default();
    if input.segment(0).gap_to(&input.segment(1)) <= input.policy.gap_threshold {
        return NamedOrder::new();
    }

    let mut order = NamedOrder::new();
    for (index, (name, segment)) in names.iter().zip(input.times).enumerate() {
        order.push_segment(name.clone(), *segment);
        if index == 0 {
            push_asset(&mut order, AssetRole::Opening, input.opening);
        }
    }
    order
}
