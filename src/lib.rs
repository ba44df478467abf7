//! TrimChap Library
//!
//! Parses Avisynth scripts for their source, custom directives and trims,
//! names the trimmed segments into an episode chapter layout, rebuilds a
//! contiguous timeline and renders a Matroska chapter file.

pub mod app;
pub mod chapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod probe;
pub mod script;
pub mod trim;
pub mod utils;

// Re-export commonly used types
pub use app::{ChapterJob, ChapterRequest};
pub use chapters::{ChapterDocument, ChapterDocumentBuilder, ChapterNamer, NamingPolicy, TimelineReconstructor};
pub use domain::model::{Atom, ChapterAsset, Edition, NamedOrder, OrderEntry, TimedSegment};
pub use error::{ChapterError, ChapterResult};
