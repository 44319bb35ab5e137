//! Render a content bundle to video.

use std::path::PathBuf;

use threadreel_common::config::AppConfig;
use threadreel_content_model::LoadedContent;
use threadreel_render_engine::export::{ProgressCallback, RenderProgress, RenderStage};
use threadreel_render_engine::render_content;

pub async fn run(
    path: PathBuf,
    output_dir: Option<PathBuf>,
    max_length: Option<f64>,
    music_volume: Option<f64>,
    width: Option<u32>,
    height: Option<u32>,
    no_only_tts: bool,
    keep_temp: bool,
) -> anyhow::Result<()> {
    println!("Rendering content at: {}", path.display());

    let mut loaded =
        LoadedContent::load(&path).map_err(|e| anyhow::anyhow!("Failed to load content: {e}"))?;

    let mut config = AppConfig::load();
    if let Some(dir) = output_dir {
        config.output.results_dir = dir;
    }
    if let Some(max) = max_length {
        config.pacing.max_length_secs = max;
    }
    if let Some(volume) = music_volume {
        loaded.content.background.music_volume = volume;
    }
    if let Some(w) = width {
        config.video.width = w;
    }
    if let Some(h) = height {
        config.video.height = h;
    }
    if no_only_tts {
        config.output.narration_only_variant = false;
    }
    if keep_temp {
        config.output.keep_temp_files = true;
    }

    println!("  Title: {}", loaded.content.title);
    println!("  Segments: {}", loaded.content.segments.len());
    println!(
        "  Resolution: {}x{} @ {}fps",
        config.video.width, config.video.height, config.video.fps
    );
    println!("  Max length: {:.0}s", config.pacing.max_length_secs);

    let progress_cb: ProgressCallback = Box::new(|p: RenderProgress| {
        let stage = match p.stage {
            RenderStage::Submitted => "submitted",
            RenderStage::Running => "encoding",
            RenderStage::Finalizing => "finalizing",
            RenderStage::Completed => "complete",
            RenderStage::Failed => "failed",
        };
        print!(
            "\r  Progress: {:>5.1}% ({:.1}s encoded, ETA: {:.0}s) [{stage}]   ",
            p.fraction * 100.0,
            p.out_time_secs,
            p.eta_secs,
        );
    });

    match render_content(&loaded, &config, Some(progress_cb)).await {
        Ok(outcome) => {
            println!();
            for result in &outcome.results {
                println!(
                    "Rendered: {} ({:.1}s, {} bytes)",
                    result.output_path.display(),
                    result.duration_secs,
                    result.byte_size
                );
            }
            println!("Background credit: {}", loaded.content.background.credit);
            if !keep_temp {
                println!("Removed {} temporary files", outcome.removed_temp_files);
            }
            Ok(())
        }
        Err(e) => {
            println!();
            eprintln!("Render failed: {e}");
            std::process::exit(1);
        }
    }
}
