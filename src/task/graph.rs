//! Dependency graph management.
//!
//! Edges are stored on the task itself (`task.dependencies` lists what the
//! task waits on). Adding an edge walks the graph to reject anything that
//! would make it cyclic; a missing referent counts as unsatisfied so a
//! dangling edge can block but never unblock a task.

use std::collections::{HashMap, HashSet};

use crate::error::Error;

use super::{Task, TaskStatus};

/// Add a depends-on edge from `task_id` to `depends_on`.
///
/// Idempotent: adding an edge that already exists is a no-op success.
///
/// # Errors
///
/// `NotFound` if either ID is unknown, `InvalidDependency` if the edge
/// would create a cycle (including a self-edge).
pub fn add_edge(
    tasks: &mut HashMap<String, Task>,
    task_id: &str,
    depends_on: &str,
) -> Result<Task, Error> {
    match tasks.get(task_id) {
        None => return Err(Error::NotFound(task_id.to_string())),
        Some(task) if task.dependencies.iter().any(|d| d == depends_on) => {
            return Ok(task.clone());
        }
        Some(_) => {}
    }
    if !tasks.contains_key(depends_on) {
        return Err(Error::NotFound(depends_on.to_string()));
    }
    if task_id == depends_on || reaches(tasks, depends_on, task_id) {
        return Err(Error::InvalidDependency(format!(
            "Task {} cannot depend on {}: would create a dependency cycle",
            task_id, depends_on
        )));
    }

    let task = tasks
        .get_mut(task_id)
        .ok_or_else(|| Error::NotFound(task_id.to_string()))?;
    task.dependencies.push(depends_on.to_string());
    Ok(task.clone())
}

/// Remove the depends-on edge if present; no-op if absent.
///
/// # Errors
///
/// `NotFound` only if `task_id` is unknown.
pub fn remove_edge(
    tasks: &mut HashMap<String, Task>,
    task_id: &str,
    depends_on: &str,
) -> Result<Task, Error> {
    let task = tasks
        .get_mut(task_id)
        .ok_or_else(|| Error::NotFound(task_id.to_string()))?;
    task.dependencies.retain(|d| d != depends_on);
    Ok(task.clone())
}

/// True iff every dependency of `task` exists and is `completed`.
///
/// A missing referent (e.g. deleted out from under the edge) is treated as
/// not satisfied.
pub fn dependencies_satisfied(task: &Task, tasks: &HashMap<String, Task>) -> bool {
    task.dependencies.iter().all(|dep| {
        tasks
            .get(dep)
            .map(|t| t.status == TaskStatus::Completed)
            .unwrap_or(false)
    })
}

/// Depth-first walk along dependency edges: can `target` be reached from
/// `from`?
fn reaches(tasks: &HashMap<String, Task>, from: &str, target: &str) -> bool {
    let mut stack = vec![from.to_string()];
    let mut seen: HashSet<String> = HashSet::new();
    while let Some(id) = stack.pop() {
        if id == target {
            return true;
        }
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(task) = tasks.get(&id) {
            stack.extend(task.dependencies.iter().cloned());
        }
    }
    false
}
