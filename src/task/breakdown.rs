//! Subtask generation.
//!
//! Stands in for the generator service: decomposition comes from a fixed
//! phase table with the parent task substituted in, which keeps the output
//! deterministic. Subtasks are informational only and never scheduled.

use crate::error::Error;

use super::{Subtask, Task, TaskStatus};

pub const MIN_SUBTASKS: i64 = 1;
pub const MAX_SUBTASKS: i64 = 10;

const PHASES: [(&str, &str); 10] = [
    ("Review the request", "Restate the goal and note constraints"),
    ("Gather context", "Collect the inputs and references the work needs"),
    ("Outline the approach", "Sketch the steps before committing to them"),
    ("Draft the core work", "Produce a first complete pass"),
    ("Handle edge cases", "Walk the unusual inputs and failure paths"),
    ("Refine the draft", "Tighten and simplify the first pass"),
    ("Verify the result", "Check the output against the original request"),
    ("Polish the presentation", "Format the deliverable for its audience"),
    ("Prepare the handoff", "Summarize what was done and what remains"),
    ("Final review", "Confirm nothing in the request was missed"),
];

/// Generate `num` subtasks for the task, IDs `<parentId>.<n>` (1-based).
///
/// # Errors
///
/// `InvalidInput` when `num` is outside `1..=10`.
pub fn generate(task: &Task, num: i64) -> Result<Vec<Subtask>, Error> {
    if !(MIN_SUBTASKS..=MAX_SUBTASKS).contains(&num) {
        return Err(Error::InvalidInput(format!(
            "num must be between {} and {}, got {}",
            MIN_SUBTASKS, MAX_SUBTASKS, num
        )));
    }

    Ok((1..=num)
        .map(|n| {
            let (phase, detail) = PHASES[(n - 1) as usize % PHASES.len()];
            Subtask {
                id: format!("{}.{}", task.id, n),
                title: phase.to_string(),
                status: TaskStatus::Pending,
                description: format!("{} for \"{}\"", detail, task.title),
            }
        })
        .collect())
}
