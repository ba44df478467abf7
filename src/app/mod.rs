// Application layer - Use case interactors

pub mod chapter_job;
pub mod stamp_interactor;

pub use chapter_job::{BatchSummary, ChapterJob, ChapterOutcome, ChapterRequest};
pub use stamp_interactor::{StampInteractor, StampOutcome, StampSummary};
