//! Task input model for the scheduler.
//!
//! Tasks are read-only snapshots owned by the caller's persistence layer;
//! the engine validates them at the boundary and never mutates them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Highest task priority (most urgent)
pub const PRIORITY_HIGHEST: u8 = 1;
/// Lowest task priority
pub const PRIORITY_LOWEST: u8 = 4;

/// A task to be placed into the calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInput {
    pub id: String,
    pub name: String,
    /// Estimated duration in minutes; must be positive
    pub estimated_minutes: i64,
    /// 1 (highest) ..= 4 (lowest)
    pub priority: u8,
    /// Author's intended sequence within the plan
    pub order_index: i32,
    /// Ids of tasks that must be placed before this one
    #[serde(default)]
    pub dependency_ids: Vec<String>,
}

impl TaskInput {
    /// Create a task with default priority and no dependencies
    pub fn new(id: impl Into<String>, name: impl Into<String>, estimated_minutes: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            estimated_minutes,
            priority: PRIORITY_LOWEST,
            order_index: 0,
            dependency_ids: Vec::new(),
        }
    }

    /// Set priority (1 highest ..= 4 lowest)
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Set the intended sequence position
    pub fn with_order_index(mut self, order_index: i32) -> Self {
        self.order_index = order_index;
        self
    }

    /// Add a dependency on another task
    pub fn with_dependency(mut self, dependency_id: impl Into<String>) -> Self {
        self.dependency_ids.push(dependency_id.into());
        self
    }

    /// Validate mandatory fields.
    ///
    /// # Errors
    /// Returns an error for non-positive durations or out-of-range priority.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.estimated_minutes <= 0 {
            return Err(ValidationError::InvalidDuration {
                task_id: self.id.clone(),
                minutes: self.estimated_minutes,
            });
        }
        if !(PRIORITY_HIGHEST..=PRIORITY_LOWEST).contains(&self.priority) {
            return Err(ValidationError::InvalidPriority {
                task_id: self.id.clone(),
                value: self.priority,
            });
        }
        Ok(())
    }
}

/// Validate a scheduling batch: every task well-formed, ids unique.
pub fn validate_batch(tasks: &[TaskInput]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for task in tasks {
        task.validate()?;
        if !seen.insert(task.id.as_str()) {
            return Err(ValidationError::DuplicateTaskId {
                task_id: task.id.clone(),
            });
        }
    }
    Ok(())
}
