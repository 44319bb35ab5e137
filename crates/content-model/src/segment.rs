//! Content manifest types.
//!
//! A content bundle is a per-content-id directory produced by upstream
//! collaborators (text-to-speech, screenshot capture, background download).
//! The manifest at `meta/content.json` lists the narrated segments in
//! reading order together with the background spec; all media paths are
//! relative to the bundle root and are trusted to be finalized before the
//! render pipeline reads them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::background::BackgroundSpec;

/// Kind of narrated unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// The post title. Always the first segment.
    Title,
    /// Optional post body text.
    Body,
    /// A reply/comment.
    Reply,
}

/// One narrated unit with paired audio and image artifacts.
///
/// Identity is the segment's position in the manifest sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// What this segment is.
    pub kind: SegmentKind,

    /// Narration clip, relative to the content root.
    pub audio: String,

    /// Overlay image, relative to the content root.
    pub image: String,
}

/// Top-level content manifest (`meta/content.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Schema version.
    pub version: String,

    /// Stable content identifier (names the temp directory).
    pub id: String,

    /// Source category; becomes the results subdirectory.
    pub subreddit: String,

    /// Human-readable title; becomes the output filename.
    pub title: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Narrated segments in reading order.
    pub segments: Vec<Segment>,

    /// Background footage spec.
    pub background: BackgroundSpec,
}

/// Errors from loading or validating a content bundle.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid content manifest: {message}")]
    Invalid { message: String },
}

/// The complete in-memory representation of a loaded content bundle.
#[derive(Debug, Clone)]
pub struct LoadedContent {
    /// Filesystem path to the bundle directory.
    pub root: PathBuf,

    /// Parsed manifest.
    pub content: Content,
}

impl Content {
    /// Create a new manifest with defaults.
    pub fn new(
        id: impl Into<String>,
        subreddit: impl Into<String>,
        title: impl Into<String>,
        background: BackgroundSpec,
    ) -> Self {
        Self {
            version: "1.0".to_string(),
            id: id.into(),
            subreddit: subreddit.into(),
            title: title.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            segments: vec![],
            background,
        }
    }

    /// Validate the ordering contract: at least one segment, title first,
    /// and no title anywhere else in the sequence.
    pub fn validate(&self) -> Result<(), ContentError> {
        let Some(first) = self.segments.first() else {
            return Err(ContentError::Invalid {
                message: "manifest has no segments".to_string(),
            });
        };
        if first.kind != SegmentKind::Title {
            return Err(ContentError::Invalid {
                message: "first segment must be the title".to_string(),
            });
        }
        if self
            .segments
            .iter()
            .skip(1)
            .any(|s| s.kind == SegmentKind::Title)
        {
            return Err(ContentError::Invalid {
                message: "only the first segment may be a title".to_string(),
            });
        }
        Ok(())
    }
}

impl LoadedContent {
    /// Load and validate a content bundle from a directory.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ContentError> {
        let root = root.as_ref().to_path_buf();

        let manifest_path = root.join("meta").join("content.json");
        let manifest_json =
            std::fs::read_to_string(&manifest_path).map_err(|e| ContentError::IoError {
                path: manifest_path.clone(),
                source: e,
            })?;

        let content: Content =
            serde_json::from_str(&manifest_json).map_err(|e| ContentError::ParseError {
                path: manifest_path,
                source: e,
            })?;

        content.validate()?;

        Ok(Self { root, content })
    }

    /// Save the manifest back to disk.
    pub fn save(&self) -> Result<(), ContentError> {
        let meta_dir = self.root.join("meta");
        std::fs::create_dir_all(&meta_dir).map_err(|e| ContentError::IoError {
            path: meta_dir.clone(),
            source: e,
        })?;

        let manifest_path = meta_dir.join("content.json");
        let manifest_json =
            serde_json::to_string_pretty(&self.content).map_err(|e| ContentError::ParseError {
                path: manifest_path.clone(),
                source: e,
            })?;
        std::fs::write(&manifest_path, manifest_json).map_err(|e| ContentError::IoError {
            path: manifest_path,
            source: e,
        })
    }

    /// Absolute path of a segment's narration clip.
    pub fn audio_path(&self, segment_index: usize) -> PathBuf {
        self.root.join(&self.content.segments[segment_index].audio)
    }

    /// Absolute path of a segment's overlay image.
    pub fn image_path(&self, segment_index: usize) -> PathBuf {
        self.root.join(&self.content.segments[segment_index].image)
    }

    /// Absolute path of the raw background clip.
    pub fn background_path(&self) -> PathBuf {
        self.root.join(&self.content.background.source)
    }

    /// Absolute path of the music bed, when configured.
    pub fn music_path(&self) -> Option<PathBuf> {
        self.content
            .background
            .music
            .as_ref()
            .map(|m| self.root.join(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::OverlayPosition;

    fn sample_background() -> BackgroundSpec {
        BackgroundSpec {
            source: "background.mp4".to_string(),
            credit: "bbswitzer".to_string(),
            position: OverlayPosition::Center,
            music: None,
            music_volume: 0.0,
        }
    }

    fn segment(kind: SegmentKind, stem: &str) -> Segment {
        Segment {
            kind,
            audio: format!("mp3/{stem}.mp3"),
            image: format!("png/{stem}.png"),
        }
    }

    #[test]
    fn test_validate_requires_title_first() {
        let mut content = Content::new("abc123", "AskReddit", "A title", sample_background());
        assert!(content.validate().is_err());

        content.segments.push(segment(SegmentKind::Reply, "0"));
        assert!(content.validate().is_err());

        content
            .segments
            .insert(0, segment(SegmentKind::Title, "title"));
        assert!(content.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_title() {
        let mut content = Content::new("abc123", "AskReddit", "A title", sample_background());
        content.segments.push(segment(SegmentKind::Title, "title"));
        content.segments.push(segment(SegmentKind::Title, "again"));
        assert!(content.validate().is_err());
    }

    #[test]
    fn test_manifest_roundtrip() {
        let mut content = Content::new("abc123", "AskReddit", "A title", sample_background());
        content.segments.push(segment(SegmentKind::Title, "title"));
        content.segments.push(segment(SegmentKind::Body, "body"));
        content.segments.push(segment(SegmentKind::Reply, "0"));

        let json = serde_json::to_string(&content).unwrap();
        let parsed: Content = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, content);
        assert_eq!(parsed.segments[2].kind, SegmentKind::Reply);
    }

    #[test]
    fn test_media_paths_join_root() {
        let mut content = Content::new("abc123", "AskReddit", "A title", sample_background());
        content.segments.push(segment(SegmentKind::Title, "title"));
        let loaded = LoadedContent {
            root: PathBuf::from("/tmp/assets/temp/abc123"),
            content,
        };

        assert_eq!(
            loaded.audio_path(0),
            PathBuf::from("/tmp/assets/temp/abc123/mp3/title.mp3")
        );
        assert_eq!(
            loaded.background_path(),
            PathBuf::from("/tmp/assets/temp/abc123/background.mp4")
        );
        assert!(loaded.music_path().is_none());
    }
}
