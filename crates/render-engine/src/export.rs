//! Render driver: submits composed jobs to ffmpeg and streams progress.
//!
//! The driver owns the only interaction with the external transcoding
//! process. Its stdout (`-progress pipe:1` key/value lines) and stderr
//! (diagnostics) are drained by two reader threads publishing onto one
//! channel, so neither pipe can fill and stall the engine. Progress is
//! surfaced monotonically; a nonzero exit carries the full stderr
//! transcript and is never retried here.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::Instant;

use threadreel_common::error::{ReelError, ReelResult};

/// Progress callback for render jobs.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send>;

/// Render progress report.
#[derive(Debug, Clone, Copy)]
pub struct RenderProgress {
    /// Overall progress [0.0, 1.0], monotonically non-decreasing.
    pub fraction: f64,

    /// Encoded output time in seconds.
    pub out_time_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current driver state.
    pub stage: RenderStage,
}

/// Driver states for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Job handed to the engine, no progress observed yet.
    Submitted,
    /// Engine is emitting progress tokens.
    Running,
    /// Terminal progress token observed, waiting for process exit.
    Finalizing,
    /// Process exited zero; output artifact exists.
    Completed,
    /// Nonzero exit or abnormal termination.
    Failed,
}

/// One composed transcoding job. Constructed once, consumed once.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Prepared background clip (input 0).
    pub background: PathBuf,

    /// Overlay images in timeline order (inputs 1..=N).
    pub images: Vec<PathBuf>,

    /// Final audio track (input N+1).
    pub audio: PathBuf,

    /// Complete overlay filter graph producing `[vout]`.
    pub filter_graph: String,

    /// Destination file.
    pub output_path: PathBuf,

    /// Output frame rate.
    pub fps: u32,

    /// Video bitrate in kbps.
    pub video_bitrate_kbps: u32,

    /// Audio bitrate in kbps.
    pub audio_bitrate_kbps: u32,

    /// Total scheduled duration; bounds the output and scales progress.
    pub expected_duration_secs: f64,

    /// Encoder thread-count hint.
    pub threads: usize,
}

/// Result of a completed render.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub output_path: PathBuf,
    pub duration_secs: f64,
    pub byte_size: u64,
}

impl RenderJob {
    fn args(&self) -> Vec<String> {
        let mut args = base_args();

        args.push("-i".to_string());
        args.push(self.background.display().to_string());

        for image in &self.images {
            args.push("-loop".to_string());
            args.push("1".to_string());
            args.push("-i".to_string());
            args.push(image.display().to_string());
        }

        let audio_index = 1 + self.images.len();
        args.push("-i".to_string());
        args.push(self.audio.display().to_string());

        args.push("-filter_complex".to_string());
        args.push(self.filter_graph.clone());
        args.push("-map".to_string());
        args.push("[vout]".to_string());
        args.push("-map".to_string());
        args.push(format!("{audio_index}:a"));

        args.push("-r".to_string());
        args.push(self.fps.to_string());
        args.push("-t".to_string());
        args.push(format!("{:.6}", self.expected_duration_secs));

        args.push("-c:v".to_string());
        args.push("libx264".to_string());
        args.push("-preset".to_string());
        args.push("medium".to_string());
        args.push("-profile:v".to_string());
        args.push("high".to_string());
        args.push("-pix_fmt".to_string());
        args.push("yuv420p".to_string());
        args.push("-b:v".to_string());
        args.push(format!("{}k", self.video_bitrate_kbps.max(1000)));
        args.push("-c:a".to_string());
        args.push("aac".to_string());
        args.push("-b:a".to_string());
        args.push(format!("{}k", self.audio_bitrate_kbps.max(64)));
        args.push("-movflags".to_string());
        args.push("+faststart".to_string());
        args.push("-threads".to_string());
        args.push(self.threads.max(1).to_string());

        args.push(self.output_path.display().to_string());
        args
    }
}

/// Render one job to completion, streaming progress to the callback.
pub fn render(job: &RenderJob, progress: Option<&ProgressCallback>) -> ReelResult<RenderResult> {
    if let Some(cb) = progress {
        cb(RenderProgress {
            fraction: 0.0,
            out_time_secs: 0.0,
            eta_secs: 0.0,
            stage: RenderStage::Submitted,
        });
    }

    tracing::info!(
        output = %job.output_path.display(),
        overlays = job.images.len(),
        duration_secs = job.expected_duration_secs,
        "Submitting render job"
    );

    let run = run_ffmpeg(&job.args(), job.expected_duration_secs, progress);
    if let Err(err) = run {
        if let Some(cb) = progress {
            cb(RenderProgress {
                fraction: 0.0,
                out_time_secs: 0.0,
                eta_secs: 0.0,
                stage: RenderStage::Failed,
            });
        }
        return Err(err);
    }

    let byte_size = std::fs::metadata(&job.output_path)
        .map(|m| m.len())
        .map_err(|e| {
            ReelError::render(format!(
                "render completed but output {} is unreadable: {e}",
                job.output_path.display()
            ))
        })?;

    if let Some(cb) = progress {
        cb(RenderProgress {
            fraction: 1.0,
            out_time_secs: job.expected_duration_secs,
            eta_secs: 0.0,
            stage: RenderStage::Completed,
        });
    }

    Ok(RenderResult {
        output_path: job.output_path.clone(),
        duration_secs: job.expected_duration_secs,
        byte_size,
    })
}

/// Common flags for every engine invocation: quiet diagnostics, machine
/// readable progress on stdout.
pub(crate) fn base_args() -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-nostats".to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
    ]
}

/// Events published by the stream reader threads.
enum StreamEvent {
    /// One line from the progress channel (stdout).
    Progress(String),
    /// One line from the diagnostic channel (stderr).
    Diagnostic(String),
    /// A channel reached end of stream.
    Eof,
}

/// Run an ffmpeg invocation to completion, reporting progress.
///
/// `args` must already include the `-progress pipe:1` base flags. The
/// process never runs without its streams being drained: each pipe gets a
/// dedicated reader thread, both publishing onto one channel consumed here.
pub(crate) fn run_ffmpeg(
    args: &[String],
    expected_duration_secs: f64,
    progress: Option<&ProgressCallback>,
) -> ReelResult<()> {
    tracing::debug!(?args, "Running ffmpeg");

    let mut child = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ReelError::render(format!("Failed to start ffmpeg: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ReelError::render("Failed to capture ffmpeg stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ReelError::render("Failed to capture ffmpeg stderr"))?;

    let (tx, rx) = mpsc::channel::<StreamEvent>();
    let stdout_tx = tx.clone();
    let stdout_reader = std::thread::spawn(move || {
        for line in BufReader::new(stdout).lines() {
            let Ok(line) = line else { break };
            if stdout_tx.send(StreamEvent::Progress(line)).is_err() {
                return;
            }
        }
        stdout_tx.send(StreamEvent::Eof).ok();
    });
    let stderr_tx = tx;
    let stderr_reader = std::thread::spawn(move || {
        for line in BufReader::new(stderr).lines() {
            let Ok(line) = line else { break };
            if stderr_tx.send(StreamEvent::Diagnostic(line)).is_err() {
                return;
            }
        }
        stderr_tx.send(StreamEvent::Eof).ok();
    });

    let start = Instant::now();
    let mut state = ProgressState::default();
    let mut diagnostics = String::new();
    let mut open_streams = 2u8;

    while open_streams > 0 {
        match rx.recv() {
            Ok(StreamEvent::Progress(line)) => {
                let trimmed = line.trim();
                let Some((key, value)) = trimmed.split_once('=') else {
                    continue;
                };
                state.update(key, value);
                if key == "progress" {
                    if let Some(cb) = progress {
                        cb(state.report(expected_duration_secs, start.elapsed().as_secs_f64()));
                    } else {
                        tracing::debug!(
                            out_time_secs = state.out_time_secs,
                            complete = state.complete,
                            "ffmpeg progress"
                        );
                    }
                }
            }
            Ok(StreamEvent::Diagnostic(line)) => {
                diagnostics.push_str(&line);
                diagnostics.push('\n');
            }
            Ok(StreamEvent::Eof) => open_streams -= 1,
            // Both reader threads dropped their senders without an Eof.
            Err(_) => break,
        }
    }

    stdout_reader.join().ok();
    stderr_reader.join().ok();

    let status = child
        .wait()
        .map_err(|e| ReelError::render(format!("Failed to wait on ffmpeg: {e}")))?;

    if !status.success() {
        // Killed from outside (cancellation) lands here too: abnormal
        // termination is a terminal failure like any other.
        return Err(ReelError::render(format!(
            "ffmpeg exited with {}: {}",
            status,
            diagnostics.trim()
        )));
    }

    Ok(())
}

/// Accumulated progress-token state for one engine run.
///
/// `update` accepts tokens in any order and ignores unknown keys; the
/// reported fraction never regresses.
#[derive(Debug, Default)]
pub(crate) struct ProgressState {
    out_time_secs: f64,
    reported_fraction: f64,
    complete: bool,
}

impl ProgressState {
    pub(crate) fn update(&mut self, key: &str, value: &str) {
        match key {
            // Despite the name, out_time_ms carries microseconds.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = self.out_time_secs.max(us / 1_000_000.0);
                }
            }
            "progress" => {
                self.complete = self.complete || value == "end";
            }
            _ => {}
        }
    }

    pub(crate) fn report(
        &mut self,
        expected_duration_secs: f64,
        elapsed_secs: f64,
    ) -> RenderProgress {
        let raw = if expected_duration_secs <= 0.0 {
            0.0
        } else {
            (self.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
        };
        self.reported_fraction = self.reported_fraction.max(raw);
        if self.complete {
            self.reported_fraction = 1.0;
        }

        let fraction = self.reported_fraction;
        let eta_secs = if fraction > 0.0 {
            ((elapsed_secs / fraction) - elapsed_secs).max(0.0)
        } else {
            0.0
        };

        RenderProgress {
            fraction,
            out_time_secs: self.out_time_secs,
            eta_secs,
            stage: if self.complete {
                RenderStage::Finalizing
            } else {
                RenderStage::Running
            },
        }
    }
}

/// Whether a binary is resolvable on PATH.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
