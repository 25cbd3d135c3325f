//! Reschedule proposal engine.
//!
//! When new busy time collides with committed work, this module searches
//! for an alternative slot using the same day-walk as the scheduler,
//! scores candidates for proximity to the original placement, and emits an
//! advisory proposal. Nothing is applied until the proposal is accepted
//! through [`review`].
//!
//! Scoring combines three components (higher `context_score` is better):
//! - a baseline that decays with distance from the original slot
//! - a priority penalty that punishes moving urgent work far
//! - a density penalty that punishes over-packing an already-full day
//!
//! The relative ordering is the contract: priority weighs more than
//! density. The concrete weight constants are tuning values.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::NormalizedAvailability;
use crate::error::EngineError;
use crate::placement::Placement;
use crate::scheduler::{DaySearch, Horizon, TimeBlockScheduler, WorkHours};
use crate::task::TaskInput;

mod review;

pub use review::{accept, accept_batch, is_stale, reject, BatchReviewError, BatchReviewOutcome};

/// Lifecycle state of a reschedule proposal.
///
/// `Pending` is the only non-terminal state:
///
///   PENDING ───> ACCEPTED (terminal)
///      │
///      └──────> REJECTED (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    /// Check if a transition is valid
    pub fn can_transition_to(&self, to: &ProposalStatus) -> bool {
        match self {
            Self::Pending => matches!(to, Self::Accepted | Self::Rejected),
            Self::Accepted | Self::Rejected => false,
        }
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// An advisory, not-yet-applied alternative placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleProposal {
    pub id: String,
    pub task_id: String,
    pub original: Placement,
    pub proposed: Placement,
    pub context_score: f64,
    pub priority_penalty: f64,
    pub density_penalty: f64,
    /// Human-readable justification for audit and display
    pub reason: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Weight constants for candidate scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Multiplier on the priority-scaled displacement penalty
    pub priority_weight: f64,
    /// Multiplier on the day-load ratio penalty
    pub density_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        // Priority must dominate density
        Self {
            priority_weight: 6.0,
            density_weight: 2.5,
        }
    }
}

/// Score components for one candidate slot
#[derive(Debug, Clone, Copy)]
struct ScoreBreakdown {
    context_score: f64,
    priority_penalty: f64,
    density_penalty: f64,
}

/// Searches for and scores alternative slots for conflicted placements
pub struct RescheduleEngine {
    scheduler: TimeBlockScheduler,
    weights: ScoreWeights,
}

impl RescheduleEngine {
    /// Create an engine with default work hours and weights
    pub fn new() -> Self {
        Self {
            scheduler: TimeBlockScheduler::new(),
            weights: ScoreWeights::default(),
        }
    }

    /// Create with the work-hour configuration the schedule was built with
    pub fn with_config(config: WorkHours) -> Self {
        Self {
            scheduler: TimeBlockScheduler::with_config(config),
            weights: ScoreWeights::default(),
        }
    }

    /// Override the scoring weights
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Propose an alternative slot for a conflicted placement.
    ///
    /// # Arguments
    /// * `conflicted` - The placement that now collides with busy time
    /// * `task` - The task behind the placement
    /// * `availability` - Snapshot that already includes the new busy time
    /// * `other_placements` - Every committed placement except `conflicted`
    /// * `horizon` - Date range to search
    /// * `now` - Injected current time
    ///
    /// Returns `Ok(None)` when no feasible slot exists before the deadline
    /// or horizon end: no proposal is better than a bad one, and the caller
    /// surfaces this as "could not auto-resolve conflict". Side-effect
    /// free; the conflicted placement is not modified.
    pub fn propose(
        &self,
        conflicted: &Placement,
        task: &TaskInput,
        availability: &NormalizedAvailability,
        other_placements: &[Placement],
        horizon: &Horizon,
        now: DateTime<Utc>,
    ) -> Result<Option<RescheduleProposal>, EngineError> {
        self.scheduler.config().validate()?;
        task.validate()?;

        let mut used_minutes: HashMap<NaiveDate, i64> = HashMap::new();
        for placement in other_placements {
            *used_minutes.entry(placement.date).or_insert(0) += placement.duration_minutes;
        }

        let mut best: Option<(ScoreBreakdown, Placement)> = None;

        for date in horizon.dates() {
            let used_on_date = used_minutes.get(&date).copied().unwrap_or(0);
            match self.scheduler.search_day(
                date,
                horizon,
                task.estimated_minutes,
                availability,
                other_placements,
                used_on_date,
                now,
                None,
            ) {
                DaySearch::Found { start, end } => {
                    let candidate =
                        Placement::new(&task.id, start, end, horizon.day_index(date));
                    let breakdown = self.score(conflicted, task, &candidate, used_on_date, horizon);

                    // Strictly-greater comparison keeps the earliest
                    // candidate on ties, so the search is deterministic
                    let better = match &best {
                        Some((current, _)) => breakdown.context_score > current.context_score,
                        None => true,
                    };
                    if better {
                        best = Some((breakdown, candidate));
                    }
                }
                DaySearch::PastDeadline => break,
                DaySearch::Unavailable => {}
            }
        }

        let Some((breakdown, proposed)) = best else {
            return Ok(None);
        };

        let reason = self.build_reason(conflicted, availability, &proposed);

        Ok(Some(RescheduleProposal {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task.id.clone(),
            original: conflicted.clone(),
            proposed,
            context_score: breakdown.context_score,
            priority_penalty: breakdown.priority_penalty,
            density_penalty: breakdown.density_penalty,
            reason,
            status: ProposalStatus::Pending,
            created_at: now,
            reviewed_at: None,
        }))
    }

    fn score(
        &self,
        conflicted: &Placement,
        task: &TaskInput,
        candidate: &Placement,
        used_on_date: i64,
        horizon: &Horizon,
    ) -> ScoreBreakdown {
        let displacement_hours = (candidate.start_time - conflicted.start_time)
            .num_minutes()
            .abs() as f64
            / 60.0;
        let baseline = (100.0 - displacement_hours).max(0.0);

        let priority_penalty =
            self.weights.priority_weight * priority_factor(task.priority) * displacement_hours;
        let density_penalty =
            self.weights.density_weight * self.day_load_ratio(candidate, used_on_date, horizon);

        ScoreBreakdown {
            context_score: baseline - priority_penalty - density_penalty,
            priority_penalty,
            density_penalty,
        }
    }

    /// Scheduled minutes on the candidate's day relative to its budget:
    /// the per-day cap when one is configured, the day window otherwise.
    fn day_load_ratio(&self, candidate: &Placement, used_on_date: i64, horizon: &Horizon) -> f64 {
        let is_day_zero = candidate.date == horizon.start;
        let Some(profile) = self
            .scheduler
            .config()
            .day_profile(candidate.date, is_day_zero)
        else {
            return 0.0;
        };

        let window_minutes = (profile.window_end - profile.window_start).num_minutes();
        let budget = profile.cap.unwrap_or(window_minutes).max(1);
        (used_on_date as f64 / budget as f64).clamp(0.0, 1.0)
    }

    fn build_reason(
        &self,
        conflicted: &Placement,
        availability: &NormalizedAvailability,
        proposed: &Placement,
    ) -> String {
        let target = format!(
            "{} to {}",
            proposed.start_time.format("%Y-%m-%d %H:%M"),
            proposed.end_time.format("%H:%M")
        );
        match availability.first_blocking(conflicted.start_time, conflicted.end_time) {
            Some(blocker) => format!(
                "Displaced by {} ({} to {}); nearest free slot is {}",
                blocker.source.label(),
                blocker.start.format("%Y-%m-%d %H:%M"),
                blocker.end.format("%H:%M"),
                target,
            ),
            None => format!("Original slot is no longer free; nearest free slot is {}", target),
        }
    }
}

impl Default for RescheduleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// How strongly displacement is punished per priority level.
/// Priority 1 (highest) resists movement the most.
fn priority_factor(priority: u8) -> f64 {
    match priority {
        1 => 1.0,
        2 => 0.6,
        3 => 0.3,
        _ => 0.1,
    }
}
