//! Availability normalization.
//!
//! Merges busy time from heterogeneous sources (other plans' tasks, manual
//! tasks, synced calendar events, explicit time off) into a single ordered,
//! non-overlapping interval set the scheduler can subtract from work-hour
//! windows. Time off is kept as its own sequence because it blocks weekend
//! windows too and callers render it differently from calendar busy time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Source of a busy interval (external service or manual)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusySource {
    ExistingPlan,
    ManualTask,
    CalendarEvent,
    TimeOff,
}

impl BusySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExistingPlan => "existing_plan",
            Self::ManualTask => "manual_task",
            Self::CalendarEvent => "calendar_event",
            Self::TimeOff => "time_off",
        }
    }

    /// Human-readable label used in reschedule reasons
    pub fn label(&self) -> &'static str {
        match self {
            Self::ExistingPlan => "a task from another plan",
            Self::ManualTask => "a manually scheduled task",
            Self::CalendarEvent => "a calendar event",
            Self::TimeOff => "time off",
        }
    }
}

/// A time interval during which no task may be placed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusySlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub source: BusySource,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl BusySlot {
    /// Create a new busy slot
    ///
    /// # Errors
    /// Returns an error if `end <= start`
    pub fn try_new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        source: BusySource,
    ) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self {
            start,
            end,
            source,
            metadata: serde_json::json!({}),
        })
    }

    /// Attach opaque caller metadata (provider ids, event titles, ...)
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Half-open overlap test against an arbitrary interval
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

/// Normalized busy-time snapshot consumed by the scheduler.
///
/// Built once per scheduling invocation and never mutated in place; a new
/// snapshot replaces it on the next cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedAvailability {
    /// Merged, sorted, non-overlapping busy intervals
    pub busy_slots: Vec<BusySlot>,
    /// Merged, sorted time-off intervals (kept separate from busy_slots)
    pub time_off: Vec<BusySlot>,
    /// Hard upper bound: no placement may end after this instant
    pub deadline: Option<DateTime<Utc>>,
}

impl NormalizedAvailability {
    /// Empty availability with no deadline (nothing is busy)
    pub fn unrestricted() -> Self {
        Self {
            busy_slots: Vec::new(),
            time_off: Vec::new(),
            deadline: None,
        }
    }

    /// All blocking intervals (busy and time off) overlapping a window,
    /// in no particular order
    pub fn blocking_in(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Iterator<Item = &BusySlot> {
        self.busy_slots
            .iter()
            .chain(self.time_off.iter())
            .filter(move |slot| slot.overlaps(start, end))
    }

    /// Find a busy interval overlapping the given range, preferring the
    /// earliest one. Used to explain why a placement had to move.
    pub fn first_blocking(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<&BusySlot> {
        self.blocking_in(start, end).min_by_key(|slot| slot.start)
    }
}

/// Normalize raw busy time into a single snapshot.
///
/// Input slots may overlap or be unsorted; output sequences are sorted
/// ascending by start and merged so that no two entries overlap or touch.
/// Pure function of its inputs.
pub fn normalize(
    raw_busy_slots: Vec<BusySlot>,
    time_off: Vec<BusySlot>,
    deadline: Option<DateTime<Utc>>,
) -> NormalizedAvailability {
    NormalizedAvailability {
        busy_slots: merge_slots(raw_busy_slots),
        time_off: merge_slots(time_off),
        deadline,
    }
}

/// Interval-union merge: sort by start, then sweep, coalescing slots that
/// overlap or are contiguous. A merged slot keeps the earliest start, the
/// latest end, and the first contributor's source and metadata.
fn merge_slots(mut slots: Vec<BusySlot>) -> Vec<BusySlot> {
    slots.sort_by_key(|slot| (slot.start, slot.end));

    let mut merged: Vec<BusySlot> = Vec::with_capacity(slots.len());
    for slot in slots {
        match merged.last_mut() {
            Some(last) if slot.start <= last.end => {
                if slot.end > last.end {
                    last.end = slot.end;
                }
            }
            _ => merged.push(slot),
        }
    }
    merged
}
