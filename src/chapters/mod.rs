//! Chapter naming, timeline reconstruction and document rendering

pub mod document;
pub mod layout;
pub mod namer;
pub mod timeline;

pub use document::{ChapterDocument, ChapterDocumentBuilder, UidGenerator};
pub use layout::{CountBucket, SegmentShape};
pub use namer::{ChapterNamer, NamingPolicy};
pub use timeline::{is_continuous, ChapterTiming, TimelineReconstructor};
