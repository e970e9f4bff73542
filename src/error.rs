//! Service error taxonomy with HTTP status mapping.
//!
//! Every validation failure is surfaced synchronously to the caller as a
//! 4xx response. `UpstreamUnavailable` is the one degraded, non-fatal kind:
//! the create path logs it and falls back to local simulation instead of
//! returning it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

/// Errors produced by the task store, graph manager, and API validation.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Missing or malformed required field.
    #[error("{0}")]
    InvalidInput(String),

    /// Unknown task or dependency ID.
    #[error("Task {0} not found")]
    NotFound(String),

    /// Status value outside the enumerated set.
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Priority value outside the enumerated set.
    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    /// Dependency edge that would make the graph cyclic.
    #[error("{0}")]
    InvalidDependency(String),

    /// Routing collaborator unreachable. Degraded, never fatal.
    #[error("Routing service unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl Error {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::InvalidInput(_)
            | Error::InvalidStatus(_)
            | Error::InvalidPriority(_)
            | Error::InvalidDependency(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}
