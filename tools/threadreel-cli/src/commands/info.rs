//! Show content bundle information.

use std::path::PathBuf;

use threadreel_content_model::LoadedContent;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let loaded =
        LoadedContent::load(&path).map_err(|e| anyhow::anyhow!("Failed to load content: {e}"))?;

    let c = &loaded.content;

    println!("Content: {}", c.title);
    println!("  ID: {}", c.id);
    println!("  Subreddit: {}", c.subreddit);
    println!("  Created: {}", c.created_at);
    println!();

    println!("Segments: {}", c.segments.len());
    for (index, segment) in c.segments.iter().enumerate() {
        println!(
            "  [{index}] {:?}: audio={} image={}",
            segment.kind, segment.audio, segment.image
        );
    }
    println!();

    println!("Background:");
    println!("  Source: {}", c.background.source);
    println!("  Credit: {}", c.background.credit);
    println!("  Position: {:?}", c.background.position);
    match &c.background.music {
        Some(music) => println!(
            "  Music: {} (volume {:.2})",
            music, c.background.music_volume
        ),
        None => println!("  Music: none"),
    }

    Ok(())
}
