//! # Timeblock Core Library
//!
//! This library provides the scheduling and auto-rescheduling engine for
//! Timeblock's goal planner. It is pure computation: the engine consumes
//! caller-supplied snapshots (tasks, busy time, committed placements, an
//! injected "now") and returns new snapshots. It performs no I/O, reads no
//! ambient clock, and holds no state between invocations; calendar sync,
//! persistence, billing, and UI all live in the surrounding service.
//!
//! ## Architecture
//!
//! - **Availability**: Normalizes heterogeneous busy time (other plans,
//!   manual tasks, calendar events, time off) into one merged interval set
//! - **Scheduler**: Greedy first-fit placement of an ordered task list
//!   across a multi-day horizon under work-hour, capacity, deadline, and
//!   dependency constraints
//! - **Conflict**: Detects committed placements overlapped by new busy time
//! - **Reschedule**: Scores alternative slots for conflicted placements and
//!   emits advisory proposals, applied through an accept/reject state
//!   machine with optimistic-concurrency checks
//!
//! ## Key Components
//!
//! - [`normalize`]: Busy-time interval-union merge
//! - [`TimeBlockScheduler`]: Deterministic task placer
//! - [`detect_conflicts`]: Placement/busy-slot overlap scan
//! - [`RescheduleEngine`]: Proposal search and scoring

pub mod availability;
pub mod conflict;
pub mod error;
pub mod placement;
pub mod reschedule;
pub mod scheduler;
pub mod task;

pub use availability::{normalize, BusySlot, BusySource, NormalizedAvailability};
pub use conflict::detect_conflicts;
pub use error::{ConfigError, EngineError, ProposalError, ValidationError};
pub use placement::Placement;
pub use reschedule::{
    accept, accept_batch, is_stale, reject, BatchReviewError, BatchReviewOutcome, ProposalStatus,
    RescheduleEngine, RescheduleProposal, ScoreWeights,
};
pub use scheduler::{
    Horizon, ScheduleOutcome, TimeBlockScheduler, UnplacedReason, UnplacedTask, WorkHours,
};
pub use task::TaskInput;
