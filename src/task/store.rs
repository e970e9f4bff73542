//! In-memory task store.
//!
//! Owns the canonical map from ID to task and issues monotonically
//! increasing identifiers. All mutation happens under the write lock, so
//! each operation is atomic from the point of view of every other request
//! and of the completion simulator.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::error::Error;

use super::graph;
use super::task::derived_title;
use super::{numeric_id, Priority, Task};

/// Input for creating a task. Everything except the prompt has a default.
#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    pub prompt: String,
    pub title: Option<String>,
    pub context: Option<String>,
    pub model: Option<String>,
    pub priority: Option<Priority>,
    pub dependencies: Vec<String>,
}

/// Authoritative in-memory collection of tasks.
pub struct TaskStore {
    tasks: RwLock<HashMap<String, Task>>,
    next_id: AtomicU64,
    default_model: String,
}

impl TaskStore {
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            default_model: default_model.into(),
        }
    }

    /// Validate and store a new task.
    ///
    /// Fills defaults for title (prompt-derived), model, and priority.
    /// Submitted dependencies are validated for existence before the task
    /// becomes visible; a missing reference fails `NotFound` and nothing is
    /// stored.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the prompt is empty, `NotFound` for an unknown
    /// dependency ID.
    pub async fn create(&self, input: CreateTask) -> Result<Task, Error> {
        if input.prompt.trim().is_empty() {
            return Err(Error::InvalidInput("prompt is required".to_string()));
        }

        let mut tasks = self.tasks.write().await;

        let mut dependencies: Vec<String> = Vec::new();
        for dep in input.dependencies {
            if !tasks.contains_key(&dep) {
                return Err(Error::NotFound(dep));
            }
            if !dependencies.contains(&dep) {
                dependencies.push(dep);
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let task = Task::new(
            id.clone(),
            input
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| derived_title(&input.prompt)),
            input.prompt,
            input.context,
            input.model.unwrap_or_else(|| self.default_model.clone()),
            input.priority.unwrap_or_default(),
            dependencies,
        );
        tasks.insert(id, task.clone());
        Ok(task)
    }

    /// Fetch one task by ID.
    pub async fn get(&self, id: &str) -> Result<Task, Error> {
        let tasks = self.tasks.read().await;
        tasks
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// All tasks, newest first.
    pub async fn list(&self) -> Vec<Task> {
        let tasks = self.tasks.read().await;
        let mut list: Vec<Task> = tasks.values().cloned().collect();
        list.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| numeric_id(&b.id).cmp(&numeric_id(&a.id)))
        });
        list
    }

    /// Delete a task and cascade-remove the edge from every task that
    /// depended on it.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let mut tasks = self.tasks.write().await;
        if tasks.remove(id).is_none() {
            return Err(Error::NotFound(id.to_string()));
        }
        for task in tasks.values_mut() {
            task.dependencies.retain(|dep| dep != id);
        }
        Ok(())
    }

    /// Apply an in-place mutation under the write lock and return the
    /// updated task. Callers are responsible for invariant checks that span
    /// more than one task.
    pub async fn update<F>(&self, id: &str, mutate: F) -> Result<Task, Error>
    where
        F: FnOnce(&mut Task),
    {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        mutate(task);
        Ok(task.clone())
    }

    /// Add a depends-on edge. See [`graph::add_edge`] for the rules.
    pub async fn add_dependency(&self, task_id: &str, depends_on: &str) -> Result<Task, Error> {
        let mut tasks = self.tasks.write().await;
        graph::add_edge(&mut tasks, task_id, depends_on)
    }

    /// Remove a depends-on edge; no-op if the edge is absent.
    pub async fn remove_dependency(&self, task_id: &str, depends_on: &str) -> Result<Task, Error> {
        let mut tasks = self.tasks.write().await;
        graph::remove_edge(&mut tasks, task_id, depends_on)
    }

    /// Cloned view of the whole store for lock-free selection and analysis.
    pub async fn snapshot(&self) -> HashMap<String, Task> {
        self.tasks.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use tokio_test::block_on;

    fn store() -> TaskStore {
        TaskStore::new("test-model")
    }

    fn prompt(p: &str) -> CreateTask {
        CreateTask {
            prompt: p.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn create_rejects_empty_prompt() {
        let store = store();
        let err = block_on(store.create(prompt("   "))).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn create_fills_defaults() {
        let store = store();
        let task = block_on(store.create(prompt("write the report"))).unwrap();
        assert_eq!(task.id, "1");
        assert_eq!(task.title, "write the report");
        assert_eq!(task.model, "test-model");
        assert_eq!(task.priority, Priority::Normal);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.started_at.is_none());
        assert!(task.dependencies.is_empty());
        assert!(task.subtasks.is_empty());
    }

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let store = store();
        let first = block_on(store.create(prompt("a"))).unwrap();
        let second = block_on(store.create(prompt("b"))).unwrap();
        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");

        block_on(store.delete(&second.id)).unwrap();
        let third = block_on(store.create(prompt("c"))).unwrap();
        assert_eq!(third.id, "3");
    }

    #[test]
    fn list_returns_newest_first() {
        let store = store();
        block_on(store.create(prompt("first"))).unwrap();
        block_on(store.create(prompt("second"))).unwrap();
        block_on(store.create(prompt("third"))).unwrap();

        let list = block_on(store.list());
        let ids: Vec<&str> = list.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn create_validates_submitted_dependencies() {
        let store = store();
        let a = block_on(store.create(prompt("a"))).unwrap();

        let err = block_on(store.create(CreateTask {
            prompt: "b".to_string(),
            dependencies: vec![a.id.clone(), "99".to_string()],
            ..Default::default()
        }))
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref id) if id == "99"));
        // nothing was stored for the failed submission
        assert_eq!(block_on(store.list()).len(), 1);

        let b = block_on(store.create(CreateTask {
            prompt: "b".to_string(),
            dependencies: vec![a.id.clone(), a.id.clone()],
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(b.dependencies, vec![a.id]);
    }

    #[test]
    fn delete_cascades_dependency_removal() {
        let store = store();
        let a = block_on(store.create(prompt("a"))).unwrap();
        let b = block_on(store.create(prompt("b"))).unwrap();
        block_on(store.add_dependency(&b.id, &a.id)).unwrap();

        block_on(store.delete(&a.id)).unwrap();

        let b = block_on(store.get(&b.id)).unwrap();
        assert!(b.dependencies.is_empty());
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let store = store();
        assert!(matches!(
            block_on(store.delete("7")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn update_applies_mutation() {
        let store = store();
        let task = block_on(store.create(prompt("a"))).unwrap();
        let updated = block_on(store.update(&task.id, |t| t.set_status(TaskStatus::InProgress)))
            .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert!(updated.started_at.is_some());
    }
}
