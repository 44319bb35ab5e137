//! Audio assembly: narration concatenation and optional music bed.
//!
//! The narration track is a gapless, stream-copied concatenation of the
//! included segments' clips in timeline order; perceptual spacing lives in
//! the overlay windows, never in the audio. A configured music bed is mixed
//! underneath at its configured volume with a longest-duration policy.

use std::path::{Path, PathBuf};

use threadreel_common::error::{ReelError, ReelResult};
use threadreel_content_model::segment::LoadedContent;
use threadreel_content_model::timeline::Timeline;

use crate::export::run_ffmpeg;
use crate::probe;

/// Concatenate the included segments' narration clips.
///
/// Returns the path of the assembled track inside `work_dir`.
pub fn assemble_narration(
    content: &LoadedContent,
    timeline: &Timeline,
    work_dir: &Path,
) -> ReelResult<PathBuf> {
    if timeline.entries.is_empty() {
        return Err(ReelError::content("timeline has no included segments"));
    }

    let mut list = String::new();
    for entry in &timeline.entries {
        let path = content.audio_path(entry.segment_index);
        list.push_str(&format!("file '{}'\n", escape_concat_path(&path)));
    }

    let list_path = work_dir.join("narration_list.txt");
    std::fs::write(&list_path, &list)?;

    let narration_secs: f64 = timeline.entries.iter().map(|e| e.audio_secs).sum();
    let output = work_dir.join("narration.mp3");

    let mut args = crate::export::base_args();
    args.extend([
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        list_path.display().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        output.display().to_string(),
    ]);

    tracing::info!(
        clips = timeline.entries.len(),
        narration_secs,
        "Assembling narration track"
    );
    run_ffmpeg(&args, narration_secs, None)?;
    Ok(output)
}

/// Mix the configured music bed under the narration track.
///
/// With a zero configured volume or no configured bed the narration track is
/// returned unchanged. A configured-but-missing music file is recoverable:
/// the mix is skipped with a warning and the unmixed track is returned.
pub fn mix_music(
    content: &LoadedContent,
    narration: &Path,
    work_dir: &Path,
    audio_bitrate_kbps: u32,
) -> ReelResult<PathBuf> {
    let spec = &content.content.background;
    if spec.music_volume <= 0.0 {
        return Ok(narration.to_path_buf());
    }
    let Some(music) = content.music_path() else {
        return Ok(narration.to_path_buf());
    };
    if !music.exists() {
        tracing::warn!(
            music = %music.display(),
            "Configured background music is missing; continuing without it"
        );
        return Ok(narration.to_path_buf());
    }

    let narration_secs = probe::media_duration_secs(narration)?;
    let music_secs = probe::media_duration_secs(&music)?;
    let expected_secs = narration_secs.max(music_secs);

    let output = work_dir.join("audio_mixed.m4a");
    let filter = format!(
        "[1:a]volume={:.3}[bed];[0:a][bed]amix=inputs=2:duration=longest:dropout_transition=0[aout]",
        spec.music_volume
    );

    let mut args = crate::export::base_args();
    args.extend([
        "-i".to_string(),
        narration.display().to_string(),
        "-i".to_string(),
        music.display().to_string(),
        "-filter_complex".to_string(),
        filter,
        "-map".to_string(),
        "[aout]".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        format!("{}k", audio_bitrate_kbps.max(64)),
        output.display().to_string(),
    ]);

    tracing::info!(
        music = %music.display(),
        volume = spec.music_volume,
        "Mixing background music"
    );
    run_ffmpeg(&args, expected_secs, None)?;
    Ok(output)
}

/// Quote a path for the concat demuxer list format.
fn escape_concat_path(path: &Path) -> String {
    path.display().to_string().replace('\'', "'\\''")
}
