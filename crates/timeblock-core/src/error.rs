//! Core error types for timeblock-core.
//!
//! This module defines the error hierarchy using thiserror. Only malformed
//! input (inverted windows, non-positive durations) is escalated as a hard
//! failure; "task did not fit" and "no alternative slot found" are result
//! values, not errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::reschedule::ProposalStatus;

/// Umbrella error type for the scheduling engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Proposal lifecycle errors
    #[error("Proposal error: {0}")]
    Proposal(#[from] ProposalError),
}

/// Work-hour configuration errors.
///
/// These are fatal to the whole call: nothing is placed until the caller
/// fixes the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Workday or weekend window ends before it starts
    #[error("Inverted work window: start {start_minute_of_day}min must be before end {end_minute_of_day}min")]
    InvertedWorkWindow {
        start_minute_of_day: u32,
        end_minute_of_day: u32,
    },

    /// Lunch window ends before it starts
    #[error("Inverted lunch window: {start_hour}:00 must not be after {end_hour}:00")]
    InvertedLunchWindow { start_hour: u32, end_hour: u32 },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be greater than start ({start})")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Task duration must be a positive number of minutes
    #[error("Invalid duration for task '{task_id}': {minutes} minutes")]
    InvalidDuration { task_id: String, minutes: i64 },

    /// Priority must be in 1 (highest) ..= 4 (lowest)
    #[error("Invalid priority for task '{task_id}': {value} (expected 1-4)")]
    InvalidPriority { task_id: String, value: u8 },

    /// Two tasks sharing an id would make dependency resolution ambiguous
    #[error("Duplicate task id '{task_id}' in scheduling batch")]
    DuplicateTaskId { task_id: String },

    /// Invalid horizon
    #[error("Invalid horizon: end date {end} is before start date {start}")]
    InvalidHorizon {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

/// Proposal lifecycle errors.
#[derive(Error, Debug)]
pub enum ProposalError {
    /// The placement a proposal targets is no longer current
    #[error("Proposal '{proposal_id}' is stale: task '{task_id}' placement changed since the proposal was created")]
    Stale { proposal_id: String, task_id: String },

    /// The proposal already left the pending state
    #[error("Proposal '{proposal_id}' was already reviewed (status: {status:?})")]
    AlreadyReviewed {
        proposal_id: String,
        status: ProposalStatus,
    },
}

/// Result type alias for EngineError
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
