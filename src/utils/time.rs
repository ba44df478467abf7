//! Timestamp rounding, parsing and formatting utilities

use crate::error::{ChapterError, ChapterResult};

/// Round seconds to millisecond precision.
///
/// Goes through the decimal rendering so ties resolve the same way a
/// `%.3f` format would, instead of the drift `(x * 1000.0).round()` has
/// for values like `0.0005`.
pub fn round_millis(seconds: f64) -> f64 {
    format!("{:.3}", seconds).parse().unwrap_or(seconds)
}

/// Convert a frame number to seconds at the given frame rate, rounded to
/// millisecond precision. The caller validates the frame rate.
pub fn frames_to_seconds(frame: u64, frame_rate: f64) -> f64 {
    round_millis(frame as f64 / frame_rate)
}

/// Format seconds as `H:MM:SS.mmm`.
///
/// Milliseconds are truncated from the shortest decimal rendering of the
/// value, never rounded: `59.9779` renders as `0:00:59.977`.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };

    let rendered = seconds.to_string();
    let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let total: u64 = whole.parse().unwrap_or(0);

    let mut millis = String::with_capacity(3);
    millis.extend(fraction.chars().take(3));
    while millis.len() < 3 {
        millis.push('0');
    }

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{}:{:02}:{:02}.{}", hours, minutes, secs, millis)
}

/// Parse `H:MM:SS.fff`, `MM:SS.fff` or plain seconds into seconds.
///
/// Any number of fractional digits is accepted so probe output such as
/// `00:01:30.048000000` parses too.
pub fn parse_timestamp(value: &str) -> ChapterResult<f64> {
    let trimmed = value.trim();
    let invalid = || ChapterError::InvalidTimestamp {
        value: value.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [s] => ("0", "0", *s),
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(invalid()),
    };

    let hours: u64 = hours.parse().map_err(|_| invalid())?;
    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: f64 = seconds.parse().map_err(|_| invalid())?;

    if !seconds.is_finite() || seconds < 0.0 || (parts.len() > 1 && (minutes >= 60 || seconds >= 60.0)) {
        return Err(invalid());
    }

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}
