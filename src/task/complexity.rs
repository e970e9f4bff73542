//! Heuristic task complexity estimation.
//!
//! Scores tasks from textual size, dependency count, and subtask presence
//! to guide planning. The score feeds the recommended subtask count and the
//! breakdown flag; it never influences scheduling.

use std::collections::HashMap;

use serde::Serialize;

use super::{numeric_id, Task};

/// Tasks scoring above this are flagged for breakdown unless the caller
/// supplies a threshold.
pub const DEFAULT_THRESHOLD: u8 = 5;

/// Per-task estimation result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskComplexity {
    pub task_id: String,
    pub title: String,
    /// Heuristic score in `1..=10`
    pub complexity: u8,
    /// Suggested breakdown size in `2..=10`
    pub recommended_subtasks: u8,
    pub needs_breakdown: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexitySummary {
    pub tasks_analyzed: usize,
    pub average_complexity: f64,
    pub needing_breakdown: usize,
}

/// Full estimation output, sorted by complexity descending.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityReport {
    pub results: Vec<TaskComplexity>,
    pub summary: ComplexitySummary,
}

/// Score one task.
///
/// `clamp(round(text_length / 200 + dependency_count + 2·has_subtasks), 1, 10)`,
/// monotonic non-decreasing in each input.
pub fn score(task: &Task) -> u8 {
    let text_length = task.prompt.len() + task.context.as_deref().map_or(0, str::len);
    let raw = text_length as f64 / 200.0
        + task.dependencies.len() as f64
        + if task.subtasks.is_empty() { 0.0 } else { 2.0 };
    (raw.round() as i64).clamp(1, 10) as u8
}

/// Suggested number of subtasks for a given complexity score.
pub fn recommended_subtasks(complexity: u8) -> u8 {
    ((complexity as f64 * 0.7).round() as i64).clamp(2, 10) as u8
}

/// Score the given tasks, or every stored task when `task_ids` is absent.
/// Unknown IDs in the filter are skipped.
pub fn analyze(
    tasks: &HashMap<String, Task>,
    task_ids: Option<&[String]>,
    threshold: Option<u8>,
) -> ComplexityReport {
    let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);

    let selected: Vec<&Task> = match task_ids {
        Some(ids) => ids.iter().filter_map(|id| tasks.get(id)).collect(),
        None => tasks.values().collect(),
    };

    let mut results: Vec<TaskComplexity> = selected
        .into_iter()
        .map(|task| {
            let complexity = score(task);
            TaskComplexity {
                task_id: task.id.clone(),
                title: task.title.clone(),
                complexity,
                recommended_subtasks: recommended_subtasks(complexity),
                needs_breakdown: complexity > threshold,
            }
        })
        .collect();
    results.sort_by_key(|r| (std::cmp::Reverse(r.complexity), numeric_id(&r.task_id)));

    let tasks_analyzed = results.len();
    let needing_breakdown = results.iter().filter(|r| r.needs_breakdown).count();
    let average_complexity = if tasks_analyzed == 0 {
        0.0
    } else {
        let sum: u32 = results.iter().map(|r| r.complexity as u32).sum();
        let mean = sum as f64 / tasks_analyzed as f64;
        (mean * 100.0).round() / 100.0
    };

    ComplexityReport {
        results,
        summary: ComplexitySummary {
            tasks_analyzed,
            average_complexity,
            needing_breakdown,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, Subtask, TaskStatus};

    fn task(id: &str, prompt: &str) -> Task {
        Task::new(
            id.to_string(),
            format!("task {}", id),
            prompt.to_string(),
            None,
            "test-model".to_string(),
            Priority::Normal,
            Vec::new(),
        )
    }

    fn map(entries: Vec<Task>) -> HashMap<String, Task> {
        entries.into_iter().map(|t| (t.id.clone(), t)).collect()
    }

    #[test]
    fn score_is_bounded() {
        let tiny = task("1", "x");
        assert_eq!(score(&tiny), 1);

        let mut huge = task("2", &"y".repeat(5_000));
        huge.dependencies = (0..20).map(|n| n.to_string()).collect();
        huge.subtasks.push(Subtask {
            id: "2.1".to_string(),
            title: "step".to_string(),
            status: TaskStatus::Pending,
            description: String::new(),
        });
        assert_eq!(score(&huge), 10);
    }

    #[test]
    fn score_matches_formula() {
        // 400 chars of text -> 2, one dependency -> 1, subtasks -> 2
        let mut task = task("1", &"p".repeat(300));
        task.context = Some("c".repeat(100));
        task.dependencies.push("9".to_string());
        task.subtasks.push(Subtask {
            id: "1.1".to_string(),
            title: "step".to_string(),
            status: TaskStatus::Pending,
            description: String::new(),
        });
        assert_eq!(score(&task), 5);
    }

    #[test]
    fn score_is_monotonic() {
        let base = task("1", &"p".repeat(100));
        let mut longer = base.clone();
        longer.prompt = "p".repeat(1_000);
        assert!(score(&longer) >= score(&base));

        let mut with_dep = base.clone();
        with_dep.dependencies.push("9".to_string());
        assert!(score(&with_dep) >= score(&base));

        let mut with_subtasks = base.clone();
        with_subtasks.subtasks.push(Subtask {
            id: "1.1".to_string(),
            title: "step".to_string(),
            status: TaskStatus::Pending,
            description: String::new(),
        });
        assert!(score(&with_subtasks) >= score(&base));
    }

    #[test]
    fn recommendation_is_bounded() {
        assert_eq!(recommended_subtasks(1), 2);
        assert_eq!(recommended_subtasks(10), 7);
        for complexity in 1..=10 {
            let n = recommended_subtasks(complexity);
            assert!((2..=10).contains(&n));
        }
    }

    #[test]
    fn results_sorted_by_complexity_descending() {
        let small = task("1", "x");
        let large = task("2", &"y".repeat(1_200));
        let report = analyze(&map(vec![small, large]), None, None);
        assert_eq!(report.results[0].task_id, "2");
        assert!(report.results[0].complexity >= report.results[1].complexity);
    }

    #[test]
    fn threshold_controls_breakdown_flag() {
        let t = task("1", &"z".repeat(1_200)); // score 6
        let tasks = map(vec![t]);

        let default = analyze(&tasks, None, None);
        assert!(default.results[0].needs_breakdown);

        let high_bar = analyze(&tasks, None, Some(6));
        assert!(!high_bar.results[0].needs_breakdown);
    }

    #[test]
    fn summary_reports_mean_and_flag_count() {
        let a = task("1", "x"); // 1
        let b = task("2", &"y".repeat(1_200)); // 6
        let report = analyze(&map(vec![a, b]), None, None);
        assert_eq!(report.summary.tasks_analyzed, 2);
        assert_eq!(report.summary.average_complexity, 3.5);
        assert_eq!(report.summary.needing_breakdown, 1);
    }

    #[test]
    fn unknown_ids_are_skipped() {
        let a = task("1", "x");
        let filter = vec!["1".to_string(), "42".to_string()];
        let report = analyze(&map(vec![a]), Some(&filter), None);
        assert_eq!(report.summary.tasks_analyzed, 1);
        assert_eq!(report.results[0].task_id, "1");
    }
}
