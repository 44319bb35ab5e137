//! Media probing via ffprobe.
//!
//! Artifacts are immutable once produced upstream, so repeated probes of the
//! same path are safe; no caching is attempted.

use std::path::Path;
use std::process::Command;

use threadreel_common::error::{ReelError, ReelResult};

/// Duration of an audio or video artifact in seconds.
///
/// Fails with a media-read error if the artifact is missing, unreadable,
/// or reports a non-positive duration.
pub fn media_duration_secs(path: &Path) -> ReelResult<f64> {
    if !path.exists() {
        return Err(ReelError::media_read(path, "artifact does not exist"));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelError::media_read(path, format!("failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReelError::media_read(
            path,
            format!("ffprobe exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let duration = parse_duration(&raw)
        .ok_or_else(|| ReelError::media_read(path, format!("unparsable duration {raw:?}")))?;

    if duration <= 0.0 {
        return Err(ReelError::media_read(
            path,
            format!("non-positive duration {duration}"),
        ));
    }

    Ok(duration)
}

/// Pixel dimensions of the first video stream.
pub fn video_dimensions(path: &Path) -> ReelResult<(u32, u32)> {
    if !path.exists() {
        return Err(ReelError::media_read(path, "artifact does not exist"));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=p=0:s=x",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelError::media_read(path, format!("failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReelError::media_read(
            path,
            format!("ffprobe exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    parse_dimensions(&raw)
        .ok_or_else(|| ReelError::media_read(path, format!("unparsable dimensions {raw:?}")))
}

fn parse_duration(raw: &str) -> Option<f64> {
    raw.lines().next()?.trim().parse::<f64>().ok()
}

fn parse_dimensions(raw: &str) -> Option<(u32, u32)> {
    let line = raw.lines().next()?.trim();
    let (w, h) = line.split_once('x')?;
    let width = w.parse::<u32>().ok()?;
    let height = h.parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("12.345000\n"), Some(12.345));
        assert_eq!(parse_duration("  3.5  "), Some(3.5));
        assert_eq!(parse_duration("N/A\n"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("1920x1080\n"), Some((1920, 1080)));
        assert_eq!(parse_dimensions("0x1080"), None);
        assert_eq!(parse_dimensions("garbage"), None);
    }

    #[test]
    fn test_missing_artifact_is_media_read() {
        let err = media_duration_secs(Path::new("/nonexistent/clip.mp3")).unwrap_err();
        assert!(matches!(
            err,
            threadreel_common::error::ReelError::MediaRead { .. }
        ));
    }
}
