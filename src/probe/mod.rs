//! Media probing through `mediainfo`
//!
//! The chapter core never probes on its own. The job layer asks a
//! [`MediaProbe`] for the source frame rate and for opening/ending asset
//! metadata, so tests can swap in a fixed implementation.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::domain::model::ChapterAsset;
use crate::error::{ensure_frame_rate, ChapterError, ChapterResult};
use crate::utils::time::parse_timestamp;

const FRAME_RATE_INFORM: &str = "Video;%FrameRate%";
const GENERAL_INFORM: &str = r"General;%Duration/String3%\n%UniqueID%";
const VIDEO_INFORM: &str = r"Video;%Duration/String3%\n%Delay%";

/// Hex digits in a Matroska segment UID
pub const SEGMENT_UID_WIDTH: usize = 32;

/// Source of media facts the chapter pipeline cannot derive itself
pub trait MediaProbe: Send + Sync {
    /// Frame rate of the first video track
    fn frame_rate(&self, path: &Path) -> ChapterResult<f64>;

    /// Duration and segment UID of an opening or ending file
    fn asset(&self, path: &Path) -> ChapterResult<ChapterAsset>;
}

/// [`MediaProbe`] backed by the `mediainfo` command line tool
#[derive(Debug, Clone)]
pub struct MediainfoProbe {
    program: PathBuf,
}

impl Default for MediainfoProbe {
    fn default() -> Self {
        Self::new("mediainfo")
    }
}

impl MediainfoProbe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn inform(&self, template: &str, path: &Path) -> ChapterResult<String> {
        if !path.is_file() {
            return Err(ChapterError::MissingSourceFile {
                path: path.display().to_string(),
            });
        }

        debug!(program = %self.program.display(), template, path = %path.display(), "Running media probe");
        let output = Command::new(&self.program)
            .arg(format!("--Inform={}", template))
            .arg(path)
            .output()
            .map_err(|e| probe_error(path, format!("failed to run {}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(probe_error(
                path,
                format!("{} exited with {}: {}", self.program.display(), output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl MediaProbe for MediainfoProbe {
    fn frame_rate(&self, path: &Path) -> ChapterResult<f64> {
        let output = self.inform(FRAME_RATE_INFORM, path)?;
        let frame_rate = parse_frame_rate_output(path, &output)?;
        info!(path = %path.display(), frame_rate, "Probed frame rate");
        Ok(frame_rate)
    }

    fn asset(&self, path: &Path) -> ChapterResult<ChapterAsset> {
        let general = self.inform(GENERAL_INFORM, path)?;
        let video = self.inform(VIDEO_INFORM, path)?;
        let asset = parse_asset_output(path, &general, &video)?;
        info!(
            path = %path.display(),
            duration = %asset.duration,
            segment_uid = %asset.segment_uid,
            "Probed chapter asset"
        );
        Ok(asset)
    }
}

fn probe_error(path: &Path, message: impl Into<String>) -> ChapterError {
    ChapterError::Probe {
        path: path.display().to_string(),
        message: message.into(),
    }
}

fn non_empty_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r').trim())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Parse the `Video;%FrameRate%` report
pub fn parse_frame_rate_output(path: &Path, output: &str) -> ChapterResult<f64> {
    let raw = output.trim();
    let frame_rate: f64 = raw
        .parse()
        .map_err(|_| probe_error(path, format!("unexpected frame rate output {:?}", raw)))?;
    ensure_frame_rate(frame_rate)
}

/// Build an asset from the general (`duration`, `unique id`) and video
/// (`duration`, `delay`) reports.
///
/// The video track duration wins over the container duration.
pub fn parse_asset_output(path: &Path, general: &str, video: &str) -> ChapterResult<ChapterAsset> {
    let general = non_empty_lines(general);
    let video = non_empty_lines(video);

    let duration = video
        .first()
        .or_else(|| general.first())
        .ok_or_else(|| probe_error(path, "no duration reported"))?;
    parse_timestamp(duration).map_err(|_| probe_error(path, format!("invalid duration {:?}", duration)))?;

    let unique_id = general
        .get(1)
        .ok_or_else(|| probe_error(path, "no segment unique id reported"))?;
    let segment_uid = segment_uid_hex(unique_id)
        .ok_or_else(|| probe_error(path, format!("invalid segment unique id {:?}", unique_id)))?;

    Ok(ChapterAsset::new(*duration, segment_uid))
}

/// Render a decimal unique id as zero-padded upper-case hex
pub fn segment_uid_hex(decimal: &str) -> Option<String> {
    let value: u128 = decimal.trim().parse().ok()?;
    Some(format!("{:0width$X}", value, width = SEGMENT_UID_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("op.mkv")
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate_output(path(), "23.976\r\n").unwrap(), 23.976);
        assert_eq!(parse_frame_rate_output(path(), "25.000\n").unwrap(), 25.0);
    }

    #[test]
    fn test_parse_frame_rate_rejects_garbage() {
        assert!(matches!(
            parse_frame_rate_output(path(), "\n"),
            Err(ChapterError::Probe { .. })
        ));
        assert!(matches!(
            parse_frame_rate_output(path(), "0"),
            Err(ChapterError::InvalidFrameRate { .. })
        ));
    }

    #[test]
    fn test_segment_uid_hex() {
        assert_eq!(
            segment_uid_hex("255").as_deref(),
            Some("000000000000000000000000000000FF")
        );
        assert_eq!(
            segment_uid_hex("340282366920938463463374607431768211455").as_deref(),
            Some("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF")
        );
        assert!(segment_uid_hex("0x1f").is_none());
    }

    #[test]
    fn test_parse_asset() {
        let general = "00:01:30.090\r\n43981\r\n";
        let video = "00:01:30.048\n0\n";
        let asset = parse_asset_output(path(), general, video).unwrap();

        assert_eq!(asset.duration, "00:01:30.048");
        assert_eq!(asset.segment_uid, "0000000000000000000000000000ABCD");
    }

    #[test]
    fn test_parse_asset_falls_back_to_container_duration() {
        let asset = parse_asset_output(path(), "00:01:30.090\n43981\n", "").unwrap();
        assert_eq!(asset.duration, "00:01:30.090");
    }

    #[test]
    fn test_parse_asset_requires_unique_id() {
        assert!(matches!(
            parse_asset_output(path(), "00:01:30.090\n", "00:01:30.048\n"),
            Err(ChapterError::Probe { .. })
        ));
    }

    #[test]
    fn test_parse_asset_rejects_bad_duration() {
        assert!(matches!(
            parse_asset_output(path(), "N/A\n43981\n", ""),
            Err(ChapterError::Probe { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let probe = MediainfoProbe::default();
        assert!(matches!(
            probe.frame_rate(Path::new("/nonexistent/source.mkv")),
            Err(ChapterError::MissingSourceFile { .. })
        ));
    }
}
