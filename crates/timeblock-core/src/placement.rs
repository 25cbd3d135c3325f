//! Committed task placements.
//!
//! A placement is one scheduled occurrence of a task. Placements are
//! superseded, never mutated: rescheduling discards the old placement and
//! commits a new one with a fresh id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A committed assignment of a task to a date/time interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub task_id: String,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    /// Offset of `date` from the horizon start, in days
    pub day_index: i64,
}

impl Placement {
    /// Create a new placement with a generated id
    pub fn new(
        task_id: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        day_index: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            date: start_time.date_naive(),
            start_time,
            end_time,
            duration_minutes: (end_time - start_time).num_minutes(),
            day_index,
        }
    }

    /// Half-open overlap test against an arbitrary interval
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }

    /// Check if this placement overlaps another
    pub fn overlaps_placement(&self, other: &Self) -> bool {
        self.overlaps(other.start_time, other.end_time)
    }

    /// True if `other` refers to the same committed slot: same placement
    /// id and same interval. Used for optimistic-concurrency checks.
    pub fn same_commit(&self, other: &Self) -> bool {
        self.id == other.id
            && self.start_time == other.start_time
            && self.end_time == other.end_time
    }
}

/// Sum of placed minutes on a given date
pub fn minutes_on_date(placements: &[Placement], date: NaiveDate) -> i64 {
    placements
        .iter()
        .filter(|p| p.date == date)
        .map(|p| p.duration_minutes)
        .sum()
}
