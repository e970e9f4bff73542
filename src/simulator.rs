//! Simulated asynchronous completion.
//!
//! Stands in for a real downstream worker: every submitted task is driven
//! from `pending` to a terminal state after a priority-dependent delay,
//! without any external I/O. The callback re-checks existence and terminal
//! state under the store lock before acting, so deleting or completing a
//! task while its timer is in flight just turns the timer into a no-op.

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::SimulatorConfig;
use crate::task::{Task, TaskStatus, TaskStore};

const FAILURE_MESSAGE: &str = "Task processing failed: the simulated worker returned an error";

/// Drives submitted tasks to a terminal state on a timer.
#[derive(Clone)]
pub struct CompletionSimulator {
    store: Arc<TaskStore>,
    config: SimulatorConfig,
}

impl CompletionSimulator {
    pub fn new(store: Arc<TaskStore>, config: SimulatorConfig) -> Self {
        Self { store, config }
    }

    /// Schedule the delayed completion of a submitted task.
    ///
    /// One spawned task per submission: a failure inside one callback is
    /// confined to that task and cannot stall completion of the others.
    pub fn schedule(&self, task_id: String) {
        let simulator = self.clone();
        tokio::spawn(async move {
            simulator.drive(task_id).await;
        });
    }

    async fn drive(&self, task_id: String) {
        sleep(self.config.pickup_delay()).await;

        let task = match self.store.get(&task_id).await {
            Ok(task) => task,
            Err(_) => {
                debug!("Task {} deleted before pickup, skipping", task_id);
                return;
            }
        };
        if task.status.is_terminal() {
            return;
        }
        if task.status == TaskStatus::Pending {
            let picked_up = self
                .store
                .update(&task_id, |t| {
                    if t.status == TaskStatus::Pending {
                        t.set_status(TaskStatus::Processing);
                    }
                })
                .await;
            if picked_up.is_err() {
                debug!("Task {} deleted before pickup, skipping", task_id);
                return;
            }
        }

        sleep(self.config.delay_for(task.priority)).await;

        let failed = rand::random::<f64>() < self.config.failure_rate;
        let result = self
            .store
            .update(&task_id, |t| {
                // Finished or failed by hand while the timer was in flight.
                if t.status.is_terminal() {
                    return;
                }
                if failed {
                    t.response = Some(FAILURE_MESSAGE.to_string());
                    t.set_status(TaskStatus::Failed);
                } else {
                    t.response = Some(simulated_response(t));
                    t.set_status(TaskStatus::Completed);
                }
            })
            .await;

        match result {
            Ok(task) => info!("Simulated completion for task {}: {}", task.id, task.status),
            Err(_) => debug!("Task {} deleted before completion, skipping", task_id),
        }
    }
}

fn simulated_response(task: &Task) -> String {
    format!(
        "Simulated {} response for \"{}\": the requested work has been completed.",
        task.model, task.title
    )
}
