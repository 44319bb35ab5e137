//! Output management: safe filenames, destination directories, cleanup.
//!
//! Titles become filenames: characters the filesystem rejects are stripped,
//! slash constructions are spelled out, and the result is clamped to a
//! filesystem-safe length only after every transformation has run, so a
//! replacement can never push the name back over the limit.

use std::path::{Path, PathBuf};

use threadreel_common::error::ReelResult;

/// Resolved destinations for one render.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    /// The music-mixed (or plain) primary output.
    pub primary: PathBuf,

    /// The narration-only variant, when configured.
    pub narration_only: Option<PathBuf>,
}

/// Resolve and create the output locations for a content bundle.
pub fn resolve_output_paths(
    results_dir: &Path,
    subreddit: &str,
    title: &str,
    filename_max_len: usize,
    narration_only_variant: bool,
) -> ReelResult<OutputPaths> {
    let filename = format!("{}.mp4", safe_filename(title, filename_max_len));

    let subreddit_dir = results_dir.join(subreddit);
    std::fs::create_dir_all(&subreddit_dir)?;
    let primary = subreddit_dir.join(&filename);

    let narration_only = if narration_only_variant {
        let tts_dir = subreddit_dir.join("OnlyTTS");
        std::fs::create_dir_all(&tts_dir)?;
        Some(tts_dir.join(&filename))
    } else {
        None
    };

    Ok(OutputPaths {
        primary,
        narration_only,
    })
}

/// Normalize a title into a filename and clamp it to `max_len` characters.
pub fn safe_filename(title: &str, max_len: usize) -> String {
    let normalized = normalize_title(title);
    normalized.chars().take(max_len).collect()
}

/// Normalize a human-readable title for filesystem use.
///
/// Strips reserved characters, spells out slash constructions (`w/o`,
/// `w/`, `2/3`, `either/or`), and drops any slash left over.
pub fn normalize_title(title: &str) -> String {
    let stripped: String = title
        .chars()
        .filter(|c| !matches!(c, '?' | '\\' | '"' | '%' | '*' | ':' | '|' | '<' | '>'))
        .collect();
    resolve_slashes(&stripped).trim().to_string()
}

fn resolve_slashes(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '/' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let before = word_before(&out);
        let (after, after_end) = word_after(&chars, i + 1);

        // "w/o" reads as "without", a bare "w/" as "with".
        if before.as_deref().is_some_and(|w| w.eq_ignore_ascii_case("w")) {
            let is_without = after
                .as_deref()
                .is_some_and(|w| w.eq_ignore_ascii_case("o") || w == "0");
            drop_word_before(&mut out);
            if is_without {
                out.push_str("without");
                i = after_end;
            } else {
                out.push_str("with");
                i += 1;
            }
            continue;
        }

        match (&before, &after) {
            (Some(b), Some(a)) => {
                let connector = if b.chars().all(|c| c.is_ascii_digit())
                    && a.chars().all(|c| c.is_ascii_digit())
                {
                    "of"
                } else {
                    "or"
                };
                if !out.ends_with(' ') {
                    out.push(' ');
                }
                out.push_str(connector);
                out.push(' ');
                out.push_str(a);
                i = after_end;
            }
            // A slash without words on both sides is simply dropped.
            _ => i += 1,
        }
    }

    out
}

/// Alphanumeric word immediately before the cursor, skipping at most one
/// space (mirrors the `\w+\s?/` shape being resolved).
fn word_before(out: &str) -> Option<String> {
    let trimmed = out.strip_suffix(' ').unwrap_or(out);
    let word: String = trimmed
        .chars()
        .rev()
        .take_while(|c| c.is_alphanumeric())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    (!word.is_empty()).then_some(word)
}

/// Alphanumeric word right after the slash, skipping at most one space.
/// Returns the word and the index just past it.
fn word_after(chars: &[char], mut start: usize) -> (Option<String>, usize) {
    if chars.get(start) == Some(&' ') {
        start += 1;
    }
    let word: String = chars[start..]
        .iter()
        .take_while(|c| c.is_alphanumeric())
        .collect();
    if word.is_empty() {
        (None, start)
    } else {
        let end = start + word.chars().count();
        (Some(word), end)
    }
}

fn drop_word_before(out: &mut String) {
    if out.ends_with(' ') {
        out.pop();
    }
    while out.chars().last().is_some_and(|c| c.is_alphanumeric()) {
        out.pop();
    }
}

/// Best-effort removal of a content bundle's temporary directory.
///
/// Returns the number of files actually removed. Errors during teardown are
/// logged and never escalated; a file already gone is not a failure.
pub fn cleanup_temp_dir(dir: &Path) -> usize {
    let mut removed = 0usize;
    remove_dir_contents(dir, &mut removed);
    if let Err(e) = std::fs::remove_dir(dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "Could not remove temp directory");
    }
    removed
}

fn remove_dir_contents(dir: &Path, removed: &mut usize) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Could not list temp directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            remove_dir_contents(&path, removed);
            if let Err(e) = std::fs::remove_dir(&path) {
                tracing::warn!(dir = %path.display(), error = %e, "Could not remove temp subdirectory");
            }
        } else {
            match std::fs::remove_file(&path) {
                Ok(()) => *removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(file = %path.display(), "Temp file already removed");
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Could not remove temp file");
                }
            }
        }
    }
}
