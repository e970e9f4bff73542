//! Next-task selection.
//!
//! Operates on a snapshot of the store, so selection never holds the store
//! lock and is deterministic for a fixed task set: candidates are the
//! non-terminal tasks, the dependency gate removes anything still waiting,
//! and the survivors are ordered by priority rank then numeric ID.

use std::collections::HashMap;

use serde::Serialize;

use super::graph::dependencies_satisfied;
use super::{numeric_id, Task, TaskStatus};

/// A follow-up operation the client is expected to take on the selected
/// task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAction {
    pub description: String,
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// One dependency of a blocked candidate, for diagnostics. Title and
/// status are absent when the referenced task no longer exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyStatus {
    pub id: String,
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
}

/// A candidate that could not be selected because of unmet dependencies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTask {
    pub task_id: String,
    pub title: String,
    pub dependencies: Vec<DependencyStatus>,
}

/// Outcome of a next-task query.
#[derive(Debug, Clone)]
pub enum NextTaskDecision {
    /// The single best task to work on next.
    Next {
        task: Task,
        suggested_actions: Vec<SuggestedAction>,
    },
    /// Candidates exist but every one is waiting on a dependency.
    Blocked {
        message: String,
        pending_dependencies: Vec<BlockedTask>,
    },
    /// Nothing non-terminal in the store.
    Idle { message: String },
}

/// Select the task to work on next.
///
/// # Guarantees
/// - deterministic for a fixed task set
/// - never selects a task with an unmet dependency
/// - never returns a task in a terminal state
pub fn next_task(tasks: &HashMap<String, Task>) -> NextTaskDecision {
    let mut candidates: Vec<&Task> = tasks.values().filter(|t| !t.status.is_terminal()).collect();
    candidates.sort_by_key(|t| numeric_id(&t.id));

    if candidates.is_empty() {
        return NextTaskDecision::Idle {
            message: "No pending tasks available".to_string(),
        };
    }

    let mut eligible: Vec<&Task> = candidates
        .iter()
        .copied()
        .filter(|t| dependencies_satisfied(t, tasks))
        .collect();

    if eligible.is_empty() {
        let pending_dependencies = candidates
            .iter()
            .map(|t| BlockedTask {
                task_id: t.id.clone(),
                title: t.title.clone(),
                dependencies: t
                    .dependencies
                    .iter()
                    .map(|dep| {
                        let referent = tasks.get(dep);
                        DependencyStatus {
                            id: dep.clone(),
                            title: referent.map(|r| r.title.clone()),
                            status: referent.map(|r| r.status),
                        }
                    })
                    .collect(),
            })
            .collect();
        return NextTaskDecision::Blocked {
            message: "All pending tasks have unmet dependencies".to_string(),
            pending_dependencies,
        };
    }

    eligible.sort_by_key(|t| (t.priority.rank(), numeric_id(&t.id)));
    let selected = eligible[0].clone();
    let suggested_actions = suggested_actions(&selected);

    NextTaskDecision::Next {
        task: selected,
        suggested_actions,
    }
}

fn suggested_actions(task: &Task) -> Vec<SuggestedAction> {
    let status_path = format!("/api/tasks/{}/status", task.id);
    let mut actions = vec![
        SuggestedAction {
            description: "Mark the task in progress".to_string(),
            method: "PUT".to_string(),
            path: status_path.clone(),
            body: Some(serde_json::json!({ "status": "in_progress" })),
        },
        SuggestedAction {
            description: "Mark the task completed".to_string(),
            method: "PUT".to_string(),
            path: status_path,
            body: Some(serde_json::json!({ "status": "completed" })),
        },
    ];
    if task.subtasks.is_empty() {
        actions.push(SuggestedAction {
            description: "Break the task into subtasks".to_string(),
            method: "POST".to_string(),
            path: format!("/api/tasks/{}/subtasks", task.id),
            body: None,
        });
    }
    actions
}
