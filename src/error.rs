use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the task store and translated into HTTP responses.
///
/// Every variant renders on the wire as `{"error": {"message": "..."}}` with
/// the status code from [`TaskError::status_code`].
#[derive(Debug, Error)]
pub enum TaskError {
    /// Lookup for a task name that is not in the store.
    #[error("Task '{0}' not found")]
    NotFound(String),

    /// Create with a task name that is already taken.
    #[error("Task '{0}' already exists")]
    Duplicate(String),

    /// Status string outside pending / in-progress / completed.
    #[error("Invalid status value: {0}")]
    InvalidStatus(String),

    /// Request body missing, unparseable, or failing field validation.
    #[error("{0}")]
    Malformed(String),

    /// Snapshot persistence or other server-side failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskError {
    /// HTTP status the error maps to on the wire.
    pub fn status_code(&self) -> StatusCode {
        match self {
            TaskError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskError::Duplicate(_) | TaskError::InvalidStatus(_) | TaskError::Malformed(_) => {
                StatusCode::BAD_REQUEST
            }
            TaskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": { "message": self.to_string() } }));
        (self.status_code(), body).into_response()
    }
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        TaskError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        TaskError::Internal(err.to_string())
    }
}
