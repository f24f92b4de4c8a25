use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::{ApplyError, PlanError, state_machine::InvalidTransition},
};

/// Errors raised by the session actions.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The store could not serve the request.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// No store is connected.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The action is not available from the current screen.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// Another action is still waiting on the store.
    #[error("another action is in progress")]
    Busy,
    /// The screen is right but the session data forbids the action.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Stored data contradicts an expected uniqueness.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The store did not answer in time.
    #[error("operation timed out")]
    Timeout,
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => ServiceError::NotFound(err.to_string()),
            StorageError::Conflict { .. } => ServiceError::Conflict(err.to_string()),
            StorageError::Unavailable { .. } => ServiceError::Unavailable(err),
        }
    }
}

impl From<PlanError> for ServiceError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::AlreadyPending => ServiceError::Busy,
            PlanError::InvalidTransition(invalid) => invalid.into(),
        }
    }
}

impl From<ApplyError> for ServiceError {
    fn from(err: ApplyError) -> Self {
        let message = match err {
            ApplyError::NoPending => "no transition is pending".to_string(),
            ApplyError::IdMismatch { .. } => "pending transition does not match".to_string(),
            ApplyError::PhaseMismatch { expected, actual } => {
                format!("state changed during transition (expected {expected:?}, got {actual:?})")
            }
            ApplyError::VersionMismatch { expected, actual } => format!(
                "state version mismatch during transition (expected {expected}, got {actual})"
            ),
        };
        ServiceError::InvalidState(message)
    }
}

/// HTTP-facing error: a status code plus a short machine-readable code.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let (status, code) = match &err {
            ServiceError::Unavailable(_) | ServiceError::Degraded => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
            }
            ServiceError::Timeout => (StatusCode::SERVICE_UNAVAILABLE, "store_timeout"),
            ServiceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            ServiceError::InvalidTransition(_) => (StatusCode::CONFLICT, "invalid_transition"),
            ServiceError::Busy => (StatusCode::CONFLICT, "busy"),
            ServiceError::InvalidState(_) => (StatusCode::CONFLICT, "invalid_state"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServiceError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_input",
            message: format!("validation failed: {errors}"),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorBody {
            error: self.code,
            message: &self.message,
        });
        (self.status, payload).into_response()
    }
}
