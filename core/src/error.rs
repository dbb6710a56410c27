//! Error types for the todo core.
//!
//! # Design
//! Every operation returns exactly one of success or a tagged failure.
//! `ValidationFailed` and `NotFound` are caller-facing outcomes; anything the
//! entity store could not do lands in `StoreUnavailable` with whatever
//! diagnostic detail the store produced. The HTTP layer decides how much of
//! that detail to reveal.

use thiserror::Error;

use crate::types::TodoId;

/// Failures returned by `TodoService` operations.
#[derive(Debug, Error)]
pub enum TodoError {
    /// A field violated a validation rule. The message names the rule.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The id does not resolve to an existing todo.
    #[error("todo {0} not found")]
    NotFound(TodoId),

    /// The entity store failed to complete the call.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl TodoError {
    pub fn validation(rule: impl Into<String>) -> Self {
        Self::ValidationFailed(rule.into())
    }
}

/// Failures reported by a `TodoStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused the write because it breaks one of its own rules.
    #[error("write rejected: {0}")]
    Rejected(String),

    /// The store could not be reached or failed mid-call.
    #[error("{0}")]
    Unavailable(String),
}

impl From<StoreError> for TodoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Rejected(rule) => Self::ValidationFailed(rule),
            StoreError::Unavailable(detail) => Self::StoreUnavailable(detail),
        }
    }
}

pub type TodoResult<T> = Result<T, TodoError>;
pub type StoreResult<T> = Result<T, StoreError>;
