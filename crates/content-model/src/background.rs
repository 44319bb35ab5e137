//! Background footage specification.
//!
//! The background spec is an explicit value carried through the pipeline;
//! there is no process-wide lookup table of named backgrounds.

use serde::{Deserialize, Serialize};

/// Where segment images are composited on the background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPosition {
    /// Centered both horizontally and vertically.
    #[default]
    Center,

    /// Horizontally centered at a fixed vertical offset in output pixels.
    Offset { offset_y: f64 },
}

/// Background footage for one render, supplied by an upstream collaborator.
///
/// The source clip is expected to be duration-sufficient; the preparer crops
/// and scales it but never extends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSpec {
    /// Path to the raw background clip, relative to the content root.
    pub source: String,

    /// Attribution for the footage, logged with the final result.
    pub credit: String,

    /// Overlay placement for segment images.
    #[serde(default)]
    pub position: OverlayPosition,

    /// Optional background-music bed, relative to the content root.
    #[serde(default)]
    pub music: Option<String>,

    /// Music volume [0.0, 1.0]; zero disables mixing entirely.
    #[serde(default)]
    pub music_volume: f64,
}

impl BackgroundSpec {
    /// Whether a music bed should be mixed under the narration.
    pub fn wants_music(&self) -> bool {
        self.music_volume > 0.0 && self.music.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_roundtrip() {
        let center: OverlayPosition = serde_json::from_str("\"center\"").unwrap();
        assert_eq!(center, OverlayPosition::Center);

        let offset: OverlayPosition =
            serde_json::from_str(r#"{"offset":{"offset_y":240.0}}"#).unwrap();
        assert_eq!(offset, OverlayPosition::Offset { offset_y: 240.0 });
    }

    #[test]
    fn test_wants_music_requires_volume_and_path() {
        let mut spec = BackgroundSpec {
            source: "background.mp4".to_string(),
            credit: "bbswitzer".to_string(),
            position: OverlayPosition::Center,
            music: Some("music.mp3".to_string()),
            music_volume: 0.0,
        };
        assert!(!spec.wants_music());

        spec.music_volume = 0.15;
        assert!(spec.wants_music());

        spec.music = None;
        assert!(!spec.wants_music());
    }
}
