// Unit tests for domain models

use super::*;
use crate::error::ChapterError;

#[test]
fn test_frame_range_to_segment() {
    let segment = FrameRange::new(0, 1438).to_segment(23.976).unwrap();
    assert_eq!(segment.start, 0.0);
    assert_eq!(segment.end, 59.977);
}

#[test]
fn test_frame_range_rejects_bad_frame_rate() {
    let err = FrameRange::new(0, 10).to_segment(0.0).unwrap_err();
    assert!(matches!(err, ChapterError::InvalidFrameRate { .. }));

    let err = FrameRange::new(0, 10).to_segment(-24.0).unwrap_err();
    assert!(matches!(err, ChapterError::InvalidFrameRate { .. }));
}

#[test]
fn test_timed_segment_rounds_and_rebases() {
    let segment = TimedSegment::new(100.12345, 200.5);
    assert_eq!(segment.start, 100.123);
    assert_eq!(segment.duration(), 200.5 - 100.123);

    let rebased = segment.rebased(100.123);
    assert_eq!(rebased.start, 0.0);
    assert_eq!(rebased.end, 100.377);
}

#[test]
fn test_timed_segment_gap() {
    let first = TimedSegment::new(0.0, 100.0);
    let second = TimedSegment::new(102.0, 200.0);
    assert_eq!(first.gap_to(&second), 2.0);
}

#[test]
fn test_named_order_keeps_pairs() {
    let opening = ChapterAsset::new("00:01:30.000", "00AB");
    let mut order = NamedOrder::new();
    order.push_asset(AssetRole::Opening, &opening);
    order.push_segment("Episode", TimedSegment::new(0.0, 600.0));

    assert_eq!(order.len(), 2);
    assert_eq!(order.names(), vec!["Opening", "Episode"]);
    assert!(order.has_assets());
    assert!(order.order()[0].is_asset());
    assert_eq!(
        order.order()[1].as_segment(),
        Some(&TimedSegment::new(0.0, 600.0))
    );

    let (names, entries) = order.into_parts();
    assert_eq!(names.len(), entries.len());
}

#[test]
fn test_empty_named_order() {
    let order = NamedOrder::new();
    assert!(order.is_empty());
    assert!(!order.has_assets());
    assert!(order.names().is_empty());
}

#[test]
fn test_asset_role_names() {
    assert_eq!(AssetRole::Opening.chapter_name(), "Opening");
    assert_eq!(AssetRole::Ending.chapter_name(), "Ending");
}
