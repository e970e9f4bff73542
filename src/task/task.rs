//! Core Task type and its lifecycle state machine.
//!
//! # Invariants
//! - `id` never changes and is never reused
//! - `started_at` is set exactly once, on first entry into an active state
//! - `completed_at` is set exactly once, on first entry into a terminal state
//! - entering `completed` forces every subtask to `completed` in the same
//!   operation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Task priority.
///
/// The scheduler orders by rank: `urgent` first, `low` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    /// Scheduling rank, ascending: `urgent=0 < high=1 < normal=2 < low=3`.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Normal => 2,
            Priority::Low => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgent" => Ok(Priority::Urgent),
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            other => Err(Error::InvalidPriority(other.to_string())),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a task in its lifecycle.
///
/// # State Machine
/// ```text
/// pending -> {processing, in_progress} -> {completed, failed}
/// ```
///
/// `processing` and `in_progress` are equivalent active states, kept
/// distinct only for compatibility with older submitters. Transitions out
/// of a terminal state are accepted idempotently; timestamps are written at
/// most once regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is queued, waiting to start
    Pending,
    /// Task was picked up by a worker
    Processing,
    /// Task is being actively worked on
    InProgress,
    /// Task completed successfully
    Completed,
    /// Task failed
    Failed,
}

impl TaskStatus {
    /// `true` for `completed` and `failed`; no automatic transition leaves
    /// a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// `true` for the two equivalent active states.
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Processing | TaskStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An informational decomposition step of a parent task.
///
/// Subtasks have no dependencies and are not scheduled independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    /// `<parentId>.<n>`, 1-based
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub description: String,
}

/// A unit of orchestrated work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned at creation, never reused
    pub id: String,

    /// Short human label, derived from the prompt when not supplied
    pub title: String,

    /// Free-text description of the work requested
    pub prompt: String,

    /// Optional supplementary information
    pub context: Option<String>,

    /// Downstream generator label servicing this task
    pub model: String,

    pub priority: Priority,

    pub status: TaskStatus,

    pub created_at: DateTime<Utc>,

    /// Set once, on first entry into an active state
    pub started_at: Option<DateTime<Utc>>,

    /// Set once, on first entry into a terminal state
    pub completed_at: Option<DateTime<Utc>>,

    /// Task IDs that must reach `completed` before this task is eligible
    pub dependencies: Vec<String>,

    /// Informational decomposition of this task
    pub subtasks: Vec<Subtask>,

    /// Result text, populated once the task reaches a terminal state
    pub response: Option<String>,
}

impl Task {
    /// Create a fresh pending task. The store assigns `id` and fills
    /// defaults before calling this.
    pub(crate) fn new(
        id: String,
        title: String,
        prompt: String,
        context: Option<String>,
        model: String,
        priority: Priority,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            id,
            title,
            prompt,
            context,
            model,
            priority,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            dependencies,
            subtasks: Vec::new(),
            response: None,
        }
    }

    /// Apply a status transition with its side effects.
    ///
    /// - first entry into an active state stamps `started_at`
    /// - first entry into a terminal state stamps `completed_at`
    /// - entering `completed` cascades `completed` onto every subtask
    ///   (one-directional: failing a parent does not fail subtasks)
    pub fn set_status(&mut self, next: TaskStatus) {
        if next.is_active() && self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        if next.is_terminal() && self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
        if next == TaskStatus::Completed {
            for subtask in &mut self.subtasks {
                subtask.status = TaskStatus::Completed;
            }
        }
        self.status = next;
    }
}

/// Default title: the first 50 characters of the prompt, with an ellipsis
/// when truncated.
pub(crate) fn derived_title(prompt: &str) -> String {
    let truncated: String = prompt.chars().take(50).collect();
    if truncated.chars().count() < prompt.chars().count() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Numeric value of a task ID for tie-breaking. IDs that do not parse sort
/// last.
pub fn numeric_id(id: &str) -> u64 {
    id.parse().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_subtasks() -> Task {
        let mut task = Task::new(
            "1".to_string(),
            "parent".to_string(),
            "do the thing".to_string(),
            None,
            "test-model".to_string(),
            Priority::Normal,
            Vec::new(),
        );
        task.subtasks = vec![
            Subtask {
                id: "1.1".to_string(),
                title: "first".to_string(),
                status: TaskStatus::Pending,
                description: String::new(),
            },
            Subtask {
                id: "1.2".to_string(),
                title: "second".to_string(),
                status: TaskStatus::Pending,
                description: String::new(),
            },
        ];
        task
    }

    #[test]
    fn parse_rejects_unknown_status() {
        assert!(matches!(
            "done".parse::<TaskStatus>(),
            Err(Error::InvalidStatus(_))
        ));
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
    }

    #[test]
    fn parse_rejects_unknown_priority() {
        assert!(matches!(
            "critical".parse::<Priority>(),
            Err(Error::InvalidPriority(_))
        ));
        assert_eq!("urgent".parse::<Priority>().unwrap(), Priority::Urgent);
    }

    #[test]
    fn priority_rank_is_fixed_order() {
        assert!(Priority::Urgent.rank() < Priority::High.rank());
        assert!(Priority::High.rank() < Priority::Normal.rank());
        assert!(Priority::Normal.rank() < Priority::Low.rank());
    }

    #[test]
    fn started_at_is_set_once() {
        let mut task = task_with_subtasks();
        assert!(task.started_at.is_none());

        task.set_status(TaskStatus::Processing);
        let first = task.started_at.expect("stamped on first active entry");

        task.set_status(TaskStatus::InProgress);
        assert_eq!(task.started_at, Some(first));
    }

    #[test]
    fn completed_at_is_set_once() {
        let mut task = task_with_subtasks();
        task.set_status(TaskStatus::Completed);
        let first = task.completed_at.expect("stamped on first terminal entry");

        task.set_status(TaskStatus::Failed);
        assert_eq!(task.completed_at, Some(first));
    }

    #[test]
    fn completing_cascades_to_subtasks() {
        let mut task = task_with_subtasks();
        task.set_status(TaskStatus::Completed);
        assert!(task
            .subtasks
            .iter()
            .all(|s| s.status == TaskStatus::Completed));
    }

    #[test]
    fn failing_does_not_cascade() {
        let mut task = task_with_subtasks();
        task.set_status(TaskStatus::Failed);
        assert!(task
            .subtasks
            .iter()
            .all(|s| s.status == TaskStatus::Pending));
    }

    #[test]
    fn timestamps_are_monotonic() {
        let mut task = task_with_subtasks();
        task.set_status(TaskStatus::InProgress);
        task.set_status(TaskStatus::Completed);

        let started = task.started_at.unwrap();
        let completed = task.completed_at.unwrap();
        assert!(task.created_at <= started);
        assert!(started <= completed);
    }

    #[test]
    fn derived_title_truncates_long_prompts() {
        let short = derived_title("fix the login page");
        assert_eq!(short, "fix the login page");

        let exactly_fifty = "a".repeat(50);
        assert_eq!(derived_title(&exactly_fifty), exactly_fifty);

        let long = "b".repeat(80);
        let title = derived_title(&long);
        assert_eq!(title, format!("{}...", "b".repeat(50)));
    }

    #[test]
    fn numeric_id_orders_numerically() {
        assert!(numeric_id("2") < numeric_id("10"));
        assert_eq!(numeric_id("not-a-number"), u64::MAX);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let task = task_with_subtasks();
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("startedAt").is_some());
        assert_eq!(json["status"], "pending");
        assert_eq!(json["priority"], "normal");
    }
}
