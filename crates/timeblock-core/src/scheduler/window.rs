//! Free-interval detection within a day's work window.
//!
//! Sweeps a sorted busy set across a window and returns the gaps left
//! over. Shared by the time-block scheduler and the reschedule engine.

use chrono::{DateTime, Utc};

/// A contiguous free interval inside a work window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FreeInterval {
    /// Get duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Check if this interval can fit a task of given duration
    pub fn can_fit(&self, minutes: i64) -> bool {
        self.duration_minutes() >= minutes
    }
}

/// Find free intervals between busy spans in a window.
///
/// # Arguments
/// * `busy` - Busy intervals as (start, end) pairs, any order
/// * `window_start` - Start of the searchable window
/// * `window_end` - End of the searchable window
///
/// # Returns
/// Free intervals sorted by start time. Zero-width gaps are dropped.
pub fn free_intervals(
    busy: &[(DateTime<Utc>, DateTime<Utc>)],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<FreeInterval> {
    let mut gaps = Vec::new();
    if window_end <= window_start {
        return gaps;
    }

    let mut sorted: Vec<_> = busy.to_vec();
    sorted.sort_by_key(|&(start, _)| start);

    let mut last_end = window_start;

    for &(start, end) in &sorted {
        if end <= last_end {
            continue;
        }
        if start >= window_end {
            break;
        }

        if start > last_end {
            gaps.push(FreeInterval {
                start: last_end,
                end: start.min(window_end),
            });
        }

        last_end = end.min(window_end);
    }

    if last_end < window_end {
        gaps.push(FreeInterval {
            start: last_end,
            end: window_end,
        });
    }

    gaps
}

/// First free interval that fits `minutes`, if any (first-fit, not
/// best-fit; ties resolved by earliest start).
pub fn first_fit(
    busy: &[(DateTime<Utc>, DateTime<Utc>)],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    minutes: i64,
) -> Option<FreeInterval> {
    free_intervals(busy, window_start, window_end)
        .into_iter()
        .find(|gap| gap.can_fit(minutes))
}
