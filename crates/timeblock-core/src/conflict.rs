//! Conflict detection between new busy time and committed placements.
//!
//! Used when a freshly synced calendar event lands on top of scheduled
//! work, and when a user manually edits a time. Read-only; resolution is
//! the reschedule engine's job.

use crate::availability::BusySlot;
use crate::placement::Placement;

/// Find every committed placement overlapping a new busy interval.
///
/// Half-open overlap test: `a.start < b.end && b.start < a.end`, so
/// touching intervals do not conflict. Results keep the input order of
/// `placements`.
pub fn detect_conflicts(new_busy_slot: &BusySlot, placements: &[Placement]) -> Vec<Placement> {
    placements
        .iter()
        .filter(|placement| placement.overlaps(new_busy_slot.start, new_busy_slot.end))
        .cloned()
        .collect()
}
