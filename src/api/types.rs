//! API request and response types.
//!
//! Serialized camelCase, matching what the service's existing clients send
//! and expect on the wire.

use serde::{Deserialize, Serialize};

use crate::task::scheduler::{BlockedTask, NextTaskDecision, SuggestedAction};
use crate::task::{Task, TaskStatus};

/// Request to submit a new task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// The work requested; required
    pub prompt: Option<String>,

    /// Optional short label (derived from the prompt if not supplied)
    pub title: Option<String>,

    /// Optional supplementary free text
    pub context: Option<String>,

    /// Optional downstream generator override
    pub model: Option<String>,

    /// Optional priority (`urgent`, `high`, `normal`, `low`)
    pub priority: Option<String>,

    /// Optional IDs of tasks that must complete first
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Response after creating a task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    pub task_id: String,

    /// Always `pending` at creation time
    pub status: TaskStatus,

    pub title: String,

    /// Routed vs. degraded-routing note
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePriorityRequest {
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDependencyRequest {
    pub depends_on: Option<String>,
}

/// Body for subtask generation. `num` defaults to the estimator's
/// recommendation for the task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateSubtasksRequest {
    pub num: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeComplexityRequest {
    /// Restrict analysis to these IDs; unknown entries are skipped
    pub task_ids: Option<Vec<String>>,

    /// Breakdown flag cutoff, default 5
    pub threshold: Option<u8>,
}

/// Scheduler query response. Exactly one arm of the decision is populated:
/// a selected task with suggested actions, a blocked diagnostic, or an idle
/// message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTaskResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_task: Option<Task>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<SuggestedAction>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_dependencies: Option<Vec<BlockedTask>>,
}

impl From<NextTaskDecision> for NextTaskResponse {
    fn from(decision: NextTaskDecision) -> Self {
        match decision {
            NextTaskDecision::Next {
                task,
                suggested_actions,
            } => Self {
                next_task: Some(task),
                suggested_actions: Some(suggested_actions),
                message: None,
                pending_dependencies: None,
            },
            NextTaskDecision::Blocked {
                message,
                pending_dependencies,
            } => Self {
                next_task: None,
                suggested_actions: None,
                message: Some(message),
                pending_dependencies: Some(pending_dependencies),
            },
            NextTaskDecision::Idle { message } => Self {
                next_task: None,
                suggested_actions: None,
                message: Some(message),
                pending_dependencies: None,
            },
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Default downstream generator label
    pub default_model: String,
}
