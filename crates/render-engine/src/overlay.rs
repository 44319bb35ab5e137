//! Overlay composition: timed image windows over the prepared background.
//!
//! Each included segment contributes one overlay operation: its image is
//! scaled to a fraction of the frame width (aspect preserved) and shown for
//! exactly its timeline window. Overlays are a strictly sequential chain,
//! title first; the graph is built as a fold over the entries, each step
//! producing a new labelled stream from the previous one.

use threadreel_content_model::background::OverlayPosition;
use threadreel_content_model::timeline::TimelineEntry;

/// Build the `filter_complex` graph for the final render.
///
/// Input 0 is the prepared background; image inputs follow in timeline
/// order at indices `1..=entries.len()`. The finished video stream is
/// always labelled `[vout]`.
pub fn build_overlay_graph(
    entries: &[TimelineEntry],
    frame_width: u32,
    opacity: f64,
    width_frac: f64,
    position: OverlayPosition,
) -> String {
    if entries.is_empty() {
        return "[0:v]null[vout]".to_string();
    }

    let scaled_width = scaled_overlay_width(frame_width, width_frac);
    let (x_expr, y_expr) = position_exprs(position);

    let mut graph = String::new();
    for index in 0..entries.len() {
        graph.push_str(&image_prep_chain(index, scaled_width, opacity));
    }

    // Fold over the entries: each overlay composes onto the previous
    // accumulated stream, producing a fresh label.
    let (chain, _) = entries.iter().enumerate().fold(
        (String::new(), "[0:v]".to_string()),
        |(mut chain, prev), (index, entry)| {
            let label = if index == entries.len() - 1 {
                "[vout]".to_string()
            } else {
                format!("[v{index}]")
            };
            chain.push_str(&format!(
                "{prev}[img{index}]overlay=x={x_expr}:y={y_expr}:enable='between(t,{:.3},{:.3})'{label};",
                entry.start_secs, entry.end_secs
            ));
            (chain, label)
        },
    );
    graph.push_str(&chain);

    graph.truncate(graph.trim_end_matches(';').len());
    graph
}

/// Preparation chain for one image input: pixel format, optional opacity,
/// fractional-width scaling with preserved aspect.
fn image_prep_chain(index: usize, scaled_width: u32, opacity: f64) -> String {
    let input = index + 1;
    if opacity < 1.0 {
        format!(
            "[{input}:v]format=rgba,colorchannelmixer=aa={opacity:.3},scale={scaled_width}:-2:flags=lanczos[img{index}];"
        )
    } else {
        format!("[{input}:v]format=rgba,scale={scaled_width}:-2:flags=lanczos[img{index}];")
    }
}

fn scaled_overlay_width(frame_width: u32, width_frac: f64) -> u32 {
    let width = (frame_width as f64 * width_frac.clamp(0.05, 1.0)).round() as u32;
    width.max(2) & !1
}

fn position_exprs(position: OverlayPosition) -> (String, String) {
    match position {
        OverlayPosition::Center => (
            "(main_w-overlay_w)/2".to_string(),
            "(main_h-overlay_h)/2".to_string(),
        ),
        OverlayPosition::Offset { offset_y } => {
            ("(main_w-overlay_w)/2".to_string(), format!("{offset_y:.0}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<TimelineEntry> {
        vec![
            TimelineEntry {
                segment_index: 0,
                start_secs: 1.5,
                end_secs: 4.5,
                audio_secs: 3.0,
            },
            TimelineEntry {
                segment_index: 1,
                start_secs: 6.5,
                end_secs: 10.5,
                audio_secs: 4.0,
            },
        ]
    }

    #[test]
    fn test_empty_entries_pass_background_through() {
        let graph = build_overlay_graph(&[], 1080, 0.9, 0.9, OverlayPosition::Center);
        assert_eq!(graph, "[0:v]null[vout]");
    }

    #[test]
    fn test_chain_is_sequential_and_ends_in_vout() {
        let graph = build_overlay_graph(&entries(), 1080, 0.9, 0.9, OverlayPosition::Center);

        // Title overlays first onto the background, then the reply onto the
        // title's output.
        assert!(graph.contains("[0:v][img0]overlay="));
        assert!(graph.contains("[v0][img1]overlay="));
        assert!(graph.ends_with("[vout]"));
        assert!(!graph.contains("[v1]"));
    }

    #[test]
    fn test_windows_appear_in_enable_clauses() {
        let graph = build_overlay_graph(&entries(), 1080, 0.9, 0.9, OverlayPosition::Center);
        assert!(graph.contains("enable='between(t,1.500,4.500)'"));
        assert!(graph.contains("enable='between(t,6.500,10.500)'"));
    }

    #[test]
    fn test_fractional_width_scaling() {
        let graph = build_overlay_graph(&entries(), 1080, 1.0, 0.9, OverlayPosition::Center);
        // 1080 * 0.9 = 972, already even.
        assert!(graph.contains("scale=972:-2"));
    }

    #[test]
    fn test_full_opacity_skips_mixer() {
        let opaque = build_overlay_graph(&entries(), 1080, 1.0, 0.9, OverlayPosition::Center);
        assert!(!opaque.contains("colorchannelmixer"));

        let translucent = build_overlay_graph(&entries(), 1080, 0.85, 0.9, OverlayPosition::Center);
        assert!(translucent.contains("colorchannelmixer=aa=0.850"));
    }

    #[test]
    fn test_offset_position() {
        let graph = build_overlay_graph(
            &entries(),
            1080,
            1.0,
            0.9,
            OverlayPosition::Offset { offset_y: 240.0 },
        );
        assert!(graph.contains(":y=240:"));
        assert!(graph.contains("x=(main_w-overlay_w)/2"));
    }

    #[test]
    fn test_scaled_width_is_even() {
        assert_eq!(scaled_overlay_width(1080, 0.9), 972);
        assert_eq!(scaled_overlay_width(1079, 0.9), 970);
        assert_eq!(scaled_overlay_width(10, 0.05), 2);
    }
}
