//! Error types shared across threadreel crates.

use std::path::PathBuf;

/// Top-level error type for threadreel operations.
#[derive(Debug, thiserror::Error)]
pub enum ReelError {
    /// An audio or video artifact could not be opened or probed.
    /// Fatal: raised before any transcoding engine invocation.
    #[error("Cannot read media {path}: {message}")]
    MediaRead { path: PathBuf, message: String },

    /// The background source cannot be cropped to the target aspect.
    /// Fatal: validated pre-flight, never discovered from engine output.
    #[error("Geometry error: {message}")]
    Geometry { message: String },

    /// The transcoding engine exited abnormally or emitted a malformed
    /// progress stream. Carries the engine's diagnostics verbatim.
    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Content error: {message}")]
    Content { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ReelError.
pub type ReelResult<T> = Result<T, ReelError>;

impl ReelError {
    pub fn media_read(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::MediaRead {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
