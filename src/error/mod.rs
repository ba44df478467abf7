//! Error handling module for TrimChap

use thiserror::Error;

/// Main error type for script parsing and chapter reconstruction
#[derive(Error, Debug)]
pub enum ChapterError {
    /// Script (or probed media file) does not exist
    #[error("File does not exist: {path}")]
    MissingSourceFile { path: String },

    /// Script has no video decoder line to resolve a source from
    #[error("No video source call found in script: {file}")]
    MissingSourceDescriptor { file: String },

    /// Video decoder argument references a variable that was never assigned
    #[error("Undefined variable: \"{variable}\"\n  File \"{file}\", line {line}, in text\n  {text}")]
    UndefinedVariable {
        variable: String,
        file: String,
        line: usize,
        text: String,
    },

    /// Trim fragment does not carry two integer frame numbers
    #[error("Malformed trim directive: {fragment}")]
    MalformedTrimDirective { fragment: String },

    /// Frame rate is zero, negative or not finite
    #[error("Invalid frame rate: {frame_rate} (must be greater than zero)")]
    InvalidFrameRate { frame_rate: f64 },

    /// Chapter annotation entry is not of the form `name[start:end]`
    #[error("Malformed chapter annotation entry: {entry}. Expected name[start:end]")]
    MalformedAnnotation { entry: String },

    /// Custom command fragment is not a `key=value` pair
    #[error("Malformed custom command: {fragment}. Expected key=value")]
    MalformedCommand { fragment: String },

    /// Custom command value cannot be interpreted
    #[error("Invalid value for custom command {key}: {value}")]
    InvalidCommandValue { key: String, value: String },

    /// Fixed name list does not provide one name per segment
    #[error("Fixed chapter names ({names}) do not match segment count ({segments})")]
    FixedNameCountMismatch { names: usize, segments: usize },

    /// A chapter would be rendered without a display name
    #[error("Chapter {index} has an empty name")]
    EmptyChapterName { index: usize },

    /// No layout rule exists for this combination
    #[error(
        "Unsupported chapter layout: {segments} segment(s), opening: {has_opening}, \
         ending: {has_ending}, fixed names: {has_fixed_names}"
    )]
    UnsupportedChapterLayout {
        segments: usize,
        has_opening: bool,
        has_ending: bool,
        has_fixed_names: bool,
    },

    /// Timestamp string could not be parsed
    #[error("Invalid timestamp: {value}. Expected H:MM:SS.mmm")]
    InvalidTimestamp { value: String },

    /// External media probe failed
    #[error("Failed to probe media file {path}: {message}")]
    Probe { path: String, message: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TrimChap operations
pub type ChapterResult<T> = std::result::Result<T, ChapterError>;

/// Reject frame rates that cannot be used as a divisor
pub fn ensure_frame_rate(frame_rate: f64) -> ChapterResult<f64> {
    if frame_rate.is_finite() && frame_rate > 0.0 {
        Ok(frame_rate)
    } else {
        Err(ChapterError::InvalidFrameRate { frame_rate })
    }
}
