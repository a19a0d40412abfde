//! HTTP error mapping.
//!
//! # Responsibility
//! - Translate core outcomes into status codes and `detail` envelopes.
//! - Keep store failure causes in logs, never in response bodies.
//!
//! # Invariants
//! - Validation failures → 422 with one entry per rejected field.
//! - Missing student → 404, duplicate email → 409, store fault → 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::Serialize;
use student_core::{FieldIssue, RepoError, StudentId, ValidationError};

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid student id `{0}`")]
    InvalidId(String),
    #[error("student not found: {0}")]
    NotFound(StudentId),
    #[error("email already registered")]
    Conflict,
    #[error("internal failure: {0}")]
    Internal(String),
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Conflict => Self::Conflict,
            other @ (RepoError::Store(_) | RepoError::InvalidData(_)) => {
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Internal(format!("store task failed: {value}"))
    }
}

/// `{"detail": "..."}` body for non-validation errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// `{"detail": [...]}` body for validation errors.
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub detail: Vec<ValidationDetail>,
}

#[derive(Debug, Serialize)]
pub struct ValidationDetail {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationDetail {
    fn from_issue(issue: &FieldIssue) -> Self {
        let mut loc = vec!["body".to_string()];
        if let Some(field) = issue.field {
            loc.push(field.to_string());
        }
        Self {
            loc,
            msg: issue.kind.to_string(),
            kind: issue.kind.code().to_string(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(err) => {
                let body = ValidationResponse {
                    detail: err.issues().iter().map(ValidationDetail::from_issue).collect(),
                };
                (status, Json(body)).into_response()
            }
            Self::InvalidId(_) => {
                let body = ValidationResponse {
                    detail: vec![ValidationDetail {
                        loc: vec!["path".to_string(), "student_id".to_string()],
                        msg: "Input should be a valid integer".to_string(),
                        kind: "int_parsing".to_string(),
                    }],
                };
                (status, Json(body)).into_response()
            }
            Self::NotFound(_) => detail(status, "Student not found"),
            Self::Conflict => detail(status, "Email already registered"),
            Self::Internal(cause) => {
                error!(
                    "event=http_error module=api status=error error_code=internal error={}",
                    cause
                );
                detail(status, "Internal Server Error")
            }
        }
    }
}

pub(crate) fn detail(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            detail: message.to_string(),
        }),
    )
        .into_response()
}
