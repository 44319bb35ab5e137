//! threadreel Render Engine
//!
//! Offline rendering pipeline that composites narrated content segments
//! with background footage into final vertical video files.
//!
//! # Pipeline Architecture
//!
//! ```text
//! mp3/*.mp3 ──── Duration Resolver
//!                      │
//!                      ▼
//!                Timeline Builder (pacing constants, length cap)
//!                      │
//!        ┌─────────────┴─────────────┐
//!        ▼                           ▼
//!  Audio Assembler             Overlay Compositor ◄── png/*.png
//!  (concat + music bed)        (timed image windows)
//!        │                           ▲
//!        │                           │
//!        │                  Background Preparer ◄── background.mp4
//!        │                           │
//!        └───────────┬───────────────┘
//!                    ▼
//!              Render Driver (ffmpeg, progress stream)
//!                    │
//!                    ▼
//!              Output Manager ──► results/<subreddit>/<title>.mp4
//! ```

pub mod audio;
pub mod background;
pub mod export;
pub mod output;
pub mod overlay;
pub mod probe;

use std::path::PathBuf;

use threadreel_common::config::AppConfig;
use threadreel_common::error::{ReelError, ReelResult};
use threadreel_content_model::segment::LoadedContent;
use threadreel_content_model::timeline::{Pacing, Timeline};

use export::{ProgressCallback, RenderJob, RenderResult};

/// Outcome of one full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Results of the completed renders, primary first.
    pub results: Vec<RenderResult>,

    /// The computed schedule that drove the renders.
    pub timeline: Timeline,

    /// Number of temporary files removed after the render.
    pub removed_temp_files: usize,
}

/// Render a content bundle to its final video file(s).
///
/// This is the main entry point. All pre-render stages are fatal on error;
/// once rendering starts, the narration-only variant still runs even if the
/// primary render fails, and the first failure is returned only after both
/// runs have finished.
pub async fn render_content(
    content: &LoadedContent,
    config: &AppConfig,
    progress: Option<ProgressCallback>,
) -> ReelResult<PipelineOutcome> {
    let started = std::time::Instant::now();
    let segments = &content.content.segments;

    tracing::info!(
        id = %content.content.id,
        subreddit = %content.content.subreddit,
        segments = segments.len(),
        "Starting render pipeline"
    );

    // Resolve narration durations for every segment up front; an unreadable
    // artifact aborts the run before the engine is ever invoked.
    let mut durations = Vec::with_capacity(segments.len());
    for index in 0..segments.len() {
        durations.push(probe::media_duration_secs(&content.audio_path(index))?);
    }

    let pacing = Pacing {
        lead_in_secs: config.pacing.lead_in_secs,
        tts_pad_secs: config.pacing.tts_pad_secs,
        inter_pad_secs: config.pacing.inter_pad_secs,
        tail_pad_secs: config.pacing.tail_pad_secs,
    };
    let timeline = Timeline::plan(&durations, &pacing, config.pacing.max_length_secs);
    if timeline.truncated(segments.len()) {
        tracing::info!(
            included = timeline.included.len(),
            total = segments.len(),
            max_length_secs = config.pacing.max_length_secs,
            "Length cap reached; trailing segments excluded"
        );
    }
    tracing::info!(
        total_secs = timeline.total_secs,
        entries = timeline.entries.len(),
        "Timeline planned"
    );

    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2);

    let prepared_background = background::prepare_background(
        &content.background_path(),
        &content.root,
        &config.video,
        threads,
    )?;

    let narration = audio::assemble_narration(content, &timeline, &content.root)?;
    let final_audio = audio::mix_music(
        content,
        &narration,
        &content.root,
        config.video.audio_bitrate_kbps,
    )?;

    let filter_graph = overlay::build_overlay_graph(
        &timeline.entries,
        config.video.width,
        config.overlay.opacity,
        config.overlay.width_frac,
        content.content.background.position,
    );

    let images: Vec<PathBuf> = timeline
        .entries
        .iter()
        .map(|e| content.image_path(e.segment_index))
        .collect();

    let paths = output::resolve_output_paths(
        &config.output.results_dir,
        &content.content.subreddit,
        &content.content.title,
        config.output.filename_max_len,
        config.output.narration_only_variant,
    )?;

    let primary_job = RenderJob {
        background: prepared_background.clone(),
        images: images.clone(),
        audio: final_audio,
        filter_graph: filter_graph.clone(),
        output_path: paths.primary.clone(),
        fps: config.video.fps,
        video_bitrate_kbps: config.video.video_bitrate_kbps,
        audio_bitrate_kbps: config.video.audio_bitrate_kbps,
        expected_duration_secs: timeline.total_secs,
        threads,
    };

    let mut results = Vec::new();
    let mut first_failure: Option<ReelError> = None;

    match export::render(&primary_job, progress.as_ref()) {
        Ok(result) => {
            tracing::info!(
                output = %result.output_path.display(),
                bytes = result.byte_size,
                "Primary render complete"
            );
            results.push(result);
        }
        Err(err) => {
            tracing::error!(error = %err, "Primary render failed");
            first_failure = Some(err);
        }
    }

    // The narration-only variant shares the visual stream but maps the
    // unmixed track; it runs regardless of the primary render's outcome.
    if let Some(narration_only_path) = paths.narration_only {
        let variant_job = RenderJob {
            background: prepared_background,
            images,
            audio: narration,
            filter_graph,
            output_path: narration_only_path,
            fps: config.video.fps,
            video_bitrate_kbps: config.video.video_bitrate_kbps,
            audio_bitrate_kbps: config.video.audio_bitrate_kbps,
            expected_duration_secs: timeline.total_secs,
            threads,
        };
        match export::render(&variant_job, progress.as_ref()) {
            Ok(result) => {
                tracing::info!(
                    output = %result.output_path.display(),
                    bytes = result.byte_size,
                    "Narration-only render complete"
                );
                results.push(result);
            }
            Err(err) => {
                tracing::error!(error = %err, "Narration-only render failed");
                first_failure.get_or_insert(err);
            }
        }
    }

    if let Some(err) = first_failure {
        return Err(err);
    }

    tracing::info!(
        credit = %content.content.background.credit,
        "Background credit"
    );

    let removed_temp_files = if config.output.keep_temp_files {
        tracing::debug!(dir = %content.root.display(), "Keeping temporary files");
        0
    } else {
        let removed = output::cleanup_temp_dir(&content.root);
        tracing::info!(removed, "Removed temporary files");
        removed
    };

    tracing::info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        outputs = results.len(),
        "Render pipeline finished"
    );

    Ok(PipelineOutcome {
        results,
        timeline,
        removed_temp_files,
    })
}
