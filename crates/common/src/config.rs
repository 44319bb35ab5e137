//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Output encoding parameters.
    pub video: VideoConfig,

    /// Pacing constants for the timeline schedule.
    pub pacing: PacingConfig,

    /// Image overlay presentation.
    pub overlay: OverlayConfig,

    /// Output locations and variants.
    pub output: OutputConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Target resolution and bitrates for the rendered file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Output width in pixels.
    pub width: u32,

    /// Output height in pixels.
    pub height: u32,

    /// Output frame rate.
    pub fps: u32,

    /// Video bitrate in kbps.
    pub video_bitrate_kbps: u32,

    /// Audio bitrate in kbps.
    pub audio_bitrate_kbps: u32,
}

/// Fixed durations controlling spacing around narration and images.
///
/// All values are seconds. The schedule never inserts these gaps into the
/// audio track itself; they shape only the overlay windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Silence before the first image appears.
    pub lead_in_secs: f64,

    /// Padding before/after each narration clip so images don't pop.
    pub tts_pad_secs: f64,

    /// Gap contributed between consecutive segments.
    pub inter_pad_secs: f64,

    /// Trailing silence before the render ends.
    pub tail_pad_secs: f64,

    /// Hard cap on total video length in seconds.
    pub max_length_secs: f64,
}

/// Image overlay presentation parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Overlay opacity [0.0, 1.0]. Values >= 1.0 render fully opaque.
    pub opacity: f64,

    /// Image width as a fraction of the frame width.
    pub width_frac: f64,
}

/// Output locations and optional variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory where rendered videos are written.
    pub results_dir: PathBuf,

    /// Also produce a narration-only variant under `OnlyTTS/`.
    pub narration_only_variant: bool,

    /// Keep the per-content temporary directory after a successful render.
    pub keep_temp_files: bool,

    /// Maximum filename length excluding extension.
    pub filename_max_len: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "threadreel=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            video_bitrate_kbps: 8000,
            audio_bitrate_kbps: 192,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            lead_in_secs: 1.0,
            tts_pad_secs: 0.5,
            inter_pad_secs: 1.0,
            tail_pad_secs: 1.0,
            max_length_secs: 50.0,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            opacity: 0.9,
            width_frac: 0.9,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            narration_only_variant: true,
            keep_temp_files: false,
            filename_max_len: 251,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("threadreel").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_vertical() {
        let config = AppConfig::default();
        assert_eq!(config.video.width, 1080);
        assert_eq!(config.video.height, 1920);
        assert!(config.video.height > config.video.width);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"pacing": {"max_length_secs": 90.0}}"#).unwrap();
        assert_eq!(config.pacing.max_length_secs, 90.0);
        assert_eq!(config.pacing.lead_in_secs, 1.0);
        assert_eq!(config.output.filename_max_len, 251);
    }
}
