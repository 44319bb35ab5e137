//! Timeline computation.
//!
//! Converts an ordered list of per-segment narration durations into an
//! absolute-time schedule of overlay windows under fixed pacing constants
//! and a hard length cap. The schedule is strictly linear: segments are
//! included in order until one would start past the cap, and everything
//! after that point is excluded (truncation, never reordering).

use serde::{Deserialize, Serialize};

/// Fixed pacing constants, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pacing {
    /// Silence before the first image appears.
    pub lead_in_secs: f64,

    /// Padding before/after each narration clip so images don't pop.
    pub tts_pad_secs: f64,

    /// Gap contributed between consecutive segments.
    pub inter_pad_secs: f64,

    /// Trailing silence before the render ends.
    pub tail_pad_secs: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            lead_in_secs: 1.0,
            tts_pad_secs: 0.5,
            inter_pad_secs: 1.0,
            tail_pad_secs: 1.0,
        }
    }
}

impl Pacing {
    /// Padding contributed ahead of every segment after the first.
    fn segment_offset_secs(&self) -> f64 {
        2.0 * self.tts_pad_secs + self.inter_pad_secs
    }
}

/// The overlay window for one included segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Position of the segment in the manifest sequence.
    pub segment_index: usize,

    /// Absolute time the segment's image becomes visible.
    pub start_secs: f64,

    /// Absolute time the segment's image disappears.
    pub end_secs: f64,

    /// Duration of the segment's narration clip.
    pub audio_secs: f64,
}

impl TimelineEntry {
    /// Length of the visibility window.
    pub fn window_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// The computed absolute-time schedule of included segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Overlay windows, ordered by start time.
    pub entries: Vec<TimelineEntry>,

    /// Indices of included segments, in order. A strict prefix of the input.
    pub included: Vec<usize>,

    /// Total rendered duration including trailing silence.
    pub total_secs: f64,
}

impl Timeline {
    /// Compute the schedule for the given narration durations.
    ///
    /// The title (index 0) is always included; its window starts after the
    /// lead-in plus one narration pad. Each subsequent segment contributes
    /// `2 * tts_pad + inter_pad` of padding ahead of its window and is
    /// included only while that padded start, plus the trailing pad, still
    /// fits inside `max_length_secs`. An included segment's narration may
    /// therefore overrun the cap by at most its own duration; that is the
    /// designed response to overflow, not an error.
    pub fn plan(durations: &[f64], pacing: &Pacing, max_length_secs: f64) -> Timeline {
        let Some((&title_secs, rest)) = durations.split_first() else {
            return Timeline {
                entries: vec![],
                included: vec![],
                total_secs: 0.0,
            };
        };

        let title_start = pacing.lead_in_secs + pacing.tts_pad_secs;
        let mut entries = vec![TimelineEntry {
            segment_index: 0,
            start_secs: title_start,
            end_secs: title_start + title_secs,
            audio_secs: title_secs,
        }];
        let mut cursor = title_start + title_secs;

        for (offset_index, &audio_secs) in rest.iter().enumerate() {
            let padded_start = cursor + pacing.segment_offset_secs();
            if padded_start + pacing.tail_pad_secs > max_length_secs {
                break;
            }
            entries.push(TimelineEntry {
                segment_index: offset_index + 1,
                start_secs: padded_start,
                end_secs: padded_start + audio_secs,
                audio_secs,
            });
            cursor = padded_start + audio_secs;
        }

        let included = entries.iter().map(|e| e.segment_index).collect();
        Timeline {
            entries,
            included,
            total_secs: cursor + pacing.tail_pad_secs,
        }
    }

    /// Whether any segments were excluded from an input of `segment_count`.
    pub fn truncated(&self, segment_count: usize) -> bool {
        self.included.len() < segment_count
    }

    /// The entry scheduled for a segment index, if it was included.
    pub fn entry_for(&self, segment_index: usize) -> Option<&TimelineEntry> {
        self.entries
            .iter()
            .find(|e| e.segment_index == segment_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacing() -> Pacing {
        Pacing {
            lead_in_secs: 1.0,
            tts_pad_secs: 0.5,
            inter_pad_secs: 1.0,
            tail_pad_secs: 1.0,
        }
    }

    #[test]
    fn test_all_segments_fit() {
        let timeline = Timeline::plan(&[3.0, 4.0, 6.0], &pacing(), 60.0);

        assert_eq!(timeline.included, vec![0, 1, 2]);
        assert_eq!(timeline.entries[0].start_secs, 1.5);
        assert_eq!(timeline.entries[0].end_secs, 4.5);
        assert_eq!(timeline.entries[1].start_secs, 6.5);
        assert_eq!(timeline.entries[1].end_secs, 10.5);
        assert_eq!(timeline.entries[2].start_secs, 12.5);
        assert_eq!(timeline.entries[2].end_secs, 18.5);
        assert!((timeline.total_secs - 19.5).abs() < 1e-9);
    }

    #[test]
    fn test_truncation_is_prefix_stopping() {
        // Title (5s) plus one reply start inside the cap; the second reply
        // would start past it and is dropped along with everything after.
        let timeline = Timeline::plan(&[5.0, 5.0, 5.0], &pacing(), 10.0);

        assert_eq!(timeline.included, vec![0, 1]);
        assert_eq!(timeline.entries.len(), 2);
        assert!(timeline.truncated(3));
    }

    #[test]
    fn test_title_always_included() {
        // Even a title far past the cap is scheduled.
        let timeline = Timeline::plan(&[120.0], &pacing(), 10.0);
        assert_eq!(timeline.included, vec![0]);
        assert!((timeline.total_secs - 122.5).abs() < 1e-9);
    }

    #[test]
    fn test_cap_overrun_is_bounded_by_one_segment() {
        let durations = [5.0, 5.0, 5.0, 5.0];
        let max = 20.0;
        let timeline = Timeline::plan(&durations, &pacing(), max);

        let last = timeline.entries.last().unwrap();
        let worst = 2.0 * 0.5 + 1.0 + last.audio_secs;
        assert!(timeline.total_secs <= max + worst + 1e-9);
    }

    #[test]
    fn test_total_monotonic_in_appended_segments() {
        let durations = [3.0, 4.0, 2.0, 6.0, 1.0];
        let mut previous = 0.0;
        for prefix in 1..=durations.len() {
            let timeline = Timeline::plan(&durations[..prefix], &pacing(), 60.0);
            assert!(timeline.total_secs >= previous);
            previous = timeline.total_secs;
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let durations = [3.3, 4.7, 2.9];
        let a = Timeline::plan(&durations, &pacing(), 45.0);
        let b = Timeline::plan(&durations, &pacing(), 45.0);
        assert_eq!(a, b);
        // Byte-identical start/end times, not merely approximately equal.
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_windows_disjoint_and_in_bounds() {
        let timeline = Timeline::plan(&[3.0, 4.0, 6.0, 2.0], &pacing(), 60.0);

        for pair in timeline.entries.windows(2) {
            assert!(pair[0].end_secs <= pair[1].start_secs);
        }
        for entry in &timeline.entries {
            assert!(entry.start_secs >= 0.0);
            assert!(entry.end_secs <= timeline.total_secs);
            assert!(entry.end_secs >= entry.start_secs + entry.audio_secs - 1e-9);
        }
    }

    #[test]
    fn test_total_covers_audio_and_padding() {
        let durations = [3.0, 4.0, 6.0];
        let timeline = Timeline::plan(&durations, &pacing(), 60.0);

        let audio_sum: f64 = timeline.entries.iter().map(|e| e.audio_secs).sum();
        let padding = 1.0 + 0.5 + 2.0 * (2.0 * 0.5 + 1.0) + 1.0;
        assert!(timeline.total_secs >= audio_sum + padding - 1e-9);
    }

    #[test]
    fn test_empty_input() {
        let timeline = Timeline::plan(&[], &pacing(), 60.0);
        assert!(timeline.entries.is_empty());
        assert_eq!(timeline.total_secs, 0.0);
    }

    #[test]
    fn test_entry_for() {
        let timeline = Timeline::plan(&[5.0, 5.0, 5.0], &pacing(), 10.0);
        assert!(timeline.entry_for(1).is_some());
        assert!(timeline.entry_for(2).is_none());
    }
}
