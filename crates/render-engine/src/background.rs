//! Background preparation: crop and scale raw footage to the target frame.
//!
//! The raw clip was selected and trimmed to a sufficient length upstream;
//! here it is center-cropped to the target aspect ratio, scaled to the
//! output resolution, and stripped of its native audio. Crop geometry is
//! validated before the engine is invoked so an undersized source fails
//! with a geometry error instead of an opaque engine diagnostic.

use std::path::{Path, PathBuf};

use threadreel_common::config::VideoConfig;
use threadreel_common::error::{ReelError, ReelResult};

use crate::export::run_ffmpeg;
use crate::probe;

/// Crop window in source pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropGeometry {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// Compute the centered crop window matching the target aspect ratio.
///
/// A source wider than the target aspect keeps its full height and loses
/// columns symmetrically; a narrower source keeps its full width and loses
/// rows. Crop dimensions are rounded down to even values for the encoder.
pub fn compute_crop(
    src_width: u32,
    src_height: u32,
    out_width: u32,
    out_height: u32,
) -> ReelResult<CropGeometry> {
    if src_width == 0 || src_height == 0 {
        return Err(ReelError::geometry(format!(
            "background reports degenerate dimensions {src_width}x{src_height}"
        )));
    }
    if out_width == 0 || out_height == 0 {
        return Err(ReelError::geometry(format!(
            "target resolution {out_width}x{out_height} is degenerate"
        )));
    }

    let src_w = i64::from(src_width);
    let src_h = i64::from(src_height);
    let out_w = i64::from(out_width);
    let out_h = i64::from(out_height);

    // Compare aspects by cross-product to stay in integer math.
    let (crop_w, crop_h) = if src_w * out_h >= out_w * src_h {
        (even_floor(src_h * out_w / out_h), even_floor(src_h))
    } else {
        (even_floor(src_w), even_floor(src_w * out_h / out_w))
    };

    let x = (src_w - crop_w) / 2;
    let y = (src_h - crop_h) / 2;

    if crop_w < 2 || crop_h < 2 || x < 0 || y < 0 {
        return Err(ReelError::geometry(format!(
            "background {src_width}x{src_height} is too small to crop to {out_width}:{out_height}"
        )));
    }

    Ok(CropGeometry {
        width: crop_w as u32,
        height: crop_h as u32,
        x: x as u32,
        y: y as u32,
    })
}

fn even_floor(value: i64) -> i64 {
    value - (value % 2)
}

/// Produce the silent, cropped and scaled background clip.
///
/// Returns the path of the prepared clip inside `work_dir`.
pub fn prepare_background(
    source: &Path,
    work_dir: &Path,
    video: &VideoConfig,
    threads: usize,
) -> ReelResult<PathBuf> {
    let (src_w, src_h) = probe::video_dimensions(source)?;
    let crop = compute_crop(src_w, src_h, video.width, video.height)?;
    let source_secs = probe::media_duration_secs(source)?;

    let output = work_dir.join("background_prepared.mp4");

    tracing::info!(
        source = %source.display(),
        source_dims = format!("{src_w}x{src_h}"),
        crop = format!("{}x{}+{}+{}", crop.width, crop.height, crop.x, crop.y),
        target = format!("{}x{}", video.width, video.height),
        "Preparing background"
    );

    let mut args = crate::export::base_args();
    args.extend([
        "-i".to_string(),
        source.display().to_string(),
        "-vf".to_string(),
        format!(
            "crop={}:{}:{}:{},scale={}:{}:flags=lanczos,format=yuv420p",
            crop.width, crop.height, crop.x, crop.y, video.width, video.height
        ),
        "-an".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-b:v".to_string(),
        format!("{}k", video.video_bitrate_kbps.max(1000)),
        "-threads".to_string(),
        threads.max(1).to_string(),
    ]);
    args.push(output.display().to_string());

    run_ffmpeg(&args, source_secs, None)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_source_crops_columns() {
        // 1920x1080 source to a 1080x1920 frame: full height, narrow window.
        let crop = compute_crop(1920, 1080, 1080, 1920).unwrap();
        assert_eq!(crop.height, 1080);
        assert_eq!(crop.width, 606); // 1080 * 1080/1920 = 607.5, even-floored
        assert_eq!(crop.y, 0);
        assert_eq!(crop.x, (1920 - 606) / 2);
    }

    #[test]
    fn test_narrow_source_crops_rows() {
        // 1080x2400 source to a 1080x1920 frame: full width, rows trimmed.
        let crop = compute_crop(1080, 2400, 1080, 1920).unwrap();
        assert_eq!(crop.width, 1080);
        assert_eq!(crop.height, 1920);
        assert_eq!(crop.x, 0);
        assert_eq!(crop.y, 240);
    }

    #[test]
    fn test_matching_aspect_is_full_frame() {
        let crop = compute_crop(540, 960, 1080, 1920).unwrap();
        assert_eq!((crop.width, crop.height), (540, 960));
        assert_eq!((crop.x, crop.y), (0, 0));
    }

    #[test]
    fn test_crop_never_exceeds_source() {
        for (sw, sh) in [(1920, 1080), (1280, 720), (3840, 2160), (608, 1080)] {
            let crop = compute_crop(sw, sh, 1080, 1920).unwrap();
            assert!(crop.width <= sw);
            assert!(crop.height <= sh);
            assert!(crop.x + crop.width <= sw);
            assert!(crop.y + crop.height <= sh);
        }
    }

    #[test]
    fn test_degenerate_source_is_geometry_error() {
        let err = compute_crop(1, 1080, 1080, 1920).unwrap_err();
        assert!(matches!(
            err,
            threadreel_common::error::ReelError::Geometry { .. }
        ));

        let err = compute_crop(0, 0, 1080, 1920).unwrap_err();
        assert!(matches!(
            err,
            threadreel_common::error::ReelError::Geometry { .. }
        ));
    }

    #[test]
    fn test_degenerate_target_is_geometry_error() {
        let err = compute_crop(1920, 1080, 0, 1920).unwrap_err();
        assert!(matches!(
            err,
            threadreel_common::error::ReelError::Geometry { .. }
        ));
    }
}
