//! HTTP API for the task orchestration service.
//!
//! ## Endpoints
//!
//! - `POST /api/tasks` - Submit a new task (routed to the collaborator)
//! - `GET /api/tasks` - List tasks, newest first
//! - `GET /api/tasks/{id}` - Fetch one task
//! - `PUT /api/tasks/{id}/status` - Set task status
//! - `PUT /api/tasks/{id}/priority` - Set task priority
//! - `DELETE /api/tasks/{id}` - Delete a task
//! - `POST /api/tasks/{id}/subtasks` - Generate 1-10 subtasks
//! - `DELETE /api/tasks/{id}/subtasks` - Clear subtasks
//! - `POST /api/tasks/{id}/dependencies` - Add a depends-on edge
//! - `DELETE /api/tasks/{id}/dependencies/{depId}` - Remove an edge
//! - `POST /api/analyze-complexity` - Score tasks for planning
//! - `GET /api/next-task` - Ask the scheduler what to work on next
//! - `GET /health` - Liveness check

mod routes;
pub mod types;

pub use routes::serve;
pub use types::*;
