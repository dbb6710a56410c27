//! Mapping core failures onto HTTP responses.
//!
//! # Design
//! Handlers attach a short description of the operation that failed with
//! `.context(..)`; the tagged `TodoError` picks the status code. Store
//! failures are logged here, once, at the boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use todo_core::{TodoError, TodoResult};
use tracing::{error, warn};

/// Failure body: `{ success: false, message, error? }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error,
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}: {source}")]
pub struct ApiError {
    message: &'static str,
    #[source]
    source: TodoError,
}

impl ApiError {
    pub fn new(message: &'static str, source: TodoError) -> Self {
        Self { message, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.source {
            TodoError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self.source {
            TodoError::NotFound(id) => {
                warn!(%id, "todo not found");
                ErrorBody::new("todo not found", None)
            }
            TodoError::ValidationFailed(rule) => ErrorBody::new(self.message, Some(rule)),
            TodoError::StoreUnavailable(detail) => {
                error!(error = %detail, "{}", self.message);
                ErrorBody::new(self.message, Some(detail))
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Attach an operation description to a core result.
pub trait Context<T> {
    fn context(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> Context<T> for TodoResult<T> {
    fn context(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|source| ApiError::new(message, source))
    }
}
