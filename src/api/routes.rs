//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::Error;
use crate::routing::{HttpTaskRouter, RouterRef};
use crate::simulator::CompletionSimulator;
use crate::task::{breakdown, complexity, scheduler, CreateTask, Task, TaskStatus, TaskStore};

use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<TaskStore>,
    /// Client for the routing collaborator
    pub router: RouterRef,
    /// Delayed completion driver
    pub simulator: CompletionSimulator,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = Arc::new(TaskStore::new(config.default_model.clone()));
    let router: RouterRef = Arc::new(HttpTaskRouter::new(config.router_url.clone()));
    let simulator = CompletionSimulator::new(Arc::clone(&store), config.simulator.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        router,
        simulator,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/tasks", post(create_task).get(list_tasks))
        .route("/api/tasks/:id", get(get_task).delete(delete_task))
        .route("/api/tasks/:id/status", put(set_status))
        .route("/api/tasks/:id/priority", put(set_priority))
        .route(
            "/api/tasks/:id/subtasks",
            post(generate_subtasks).delete(clear_subtasks),
        )
        .route("/api/tasks/:id/dependencies", post(add_dependency))
        .route(
            "/api/tasks/:id/dependencies/:dep_id",
            delete(remove_dependency),
        )
        .route("/api/analyze-complexity", post(analyze_complexity))
        .route("/api/next-task", get(next_task))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGINT/SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_model: state.config.default_model.clone(),
    })
}

/// Create a new task and hand it to the routing collaborator.
///
/// Routing failure is degraded, not fatal: the task is stored either way
/// and the completion simulator is scheduled for it.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreateTaskResponse>), Error> {
    let priority = req.priority.as_deref().map(str::parse).transpose()?;
    let task = state
        .store
        .create(CreateTask {
            prompt: req.prompt.unwrap_or_default(),
            title: req.title,
            context: req.context,
            model: req.model,
            priority,
            dependencies: req.dependencies,
        })
        .await?;

    let message = match state.router.route(&task).await {
        Ok(()) => format!("Task routed to {}", task.model),
        Err(e) => {
            tracing::warn!("Routing collaborator unreachable for task {}: {}", task.id, e);
            "Task stored; routing unavailable, completion will be simulated locally".to_string()
        }
    };

    state.simulator.schedule(task.id.clone());

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            task_id: task.id,
            status: task.status,
            title: task.title,
            message,
        }),
    ))
}

/// List all tasks, newest first.
async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    Json(state.store.list().await)
}

/// Fetch one task.
async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, Error> {
    Ok(Json(state.store.get(&id).await?))
}

/// Delete a task, dropping the edge from anything that depended on it.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Error> {
    state.store.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Task {} deleted", id)
    })))
}

/// Set task status.
async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Task>, Error> {
    let status: TaskStatus = req
        .status
        .ok_or_else(|| Error::InvalidInput("status is required".to_string()))?
        .parse()?;
    let task = state.store.update(&id, |t| t.set_status(status)).await?;
    Ok(Json(task))
}

/// Set task priority.
async fn set_priority(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePriorityRequest>,
) -> Result<Json<Task>, Error> {
    let priority = req
        .priority
        .ok_or_else(|| Error::InvalidInput("priority is required".to_string()))?
        .parse()?;
    let task = state.store.update(&id, |t| t.priority = priority).await?;
    Ok(Json(task))
}

/// Generate subtasks, replacing any existing decomposition.
async fn generate_subtasks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<GenerateSubtasksRequest>>,
) -> Result<Json<Task>, Error> {
    let task = state.store.get(&id).await?;
    let num = body.and_then(|Json(b)| b.num).unwrap_or_else(|| {
        complexity::recommended_subtasks(complexity::score(&task)) as i64
    });
    let subtasks = breakdown::generate(&task, num)?;
    let task = state.store.update(&id, move |t| t.subtasks = subtasks).await?;
    Ok(Json(task))
}

/// Clear all subtasks.
async fn clear_subtasks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, Error> {
    let task = state.store.update(&id, |t| t.subtasks.clear()).await?;
    Ok(Json(task))
}

/// Add a depends-on edge.
async fn add_dependency(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddDependencyRequest>,
) -> Result<Json<Task>, Error> {
    let depends_on = req
        .depends_on
        .ok_or_else(|| Error::InvalidInput("dependsOn is required".to_string()))?;
    let task = state.store.add_dependency(&id, &depends_on).await?;
    Ok(Json(task))
}

/// Remove a depends-on edge.
async fn remove_dependency(
    State(state): State<Arc<AppState>>,
    Path((id, dep_id)): Path<(String, String)>,
) -> Result<Json<Task>, Error> {
    let task = state.store.remove_dependency(&id, &dep_id).await?;
    Ok(Json(task))
}

/// Score tasks for planning.
async fn analyze_complexity(
    State(state): State<Arc<AppState>>,
    body: Option<Json<AnalyzeComplexityRequest>>,
) -> Json<complexity::ComplexityReport> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let tasks = state.store.snapshot().await;
    Json(complexity::analyze(
        &tasks,
        req.task_ids.as_deref(),
        req.threshold,
    ))
}

/// Ask the scheduler which task to work on next.
async fn next_task(State(state): State<Arc<AppState>>) -> Json<NextTaskResponse> {
    let tasks = state.store.snapshot().await;
    Json(scheduler::next_task(&tasks).into())
}
