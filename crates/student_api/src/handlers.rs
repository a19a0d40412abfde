//! Request handlers for the `/students` resource.
//!
//! # Responsibility
//! - Parse path ids and JSON bodies, validate writes, call the service.
//! - Run blocking store work off the async executor.
//!
//! # Invariants
//! - Handlers hold no state of their own; everything flows through `AppState`.
//! - Write bodies are validated before any session is opened.

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use student_core::{
    validate_student_payload, RepoResult, Student, StudentId, StudentInput, StudentService,
    ValidationError,
};

/// Confirmation body returned by delete.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `GET /students`
pub async fn list_students(State(state): State<AppState>) -> ApiResult<Json<Vec<Student>>> {
    let students = run_blocking(&state, |service| service.list_all()).await?;
    Ok(Json(students))
}

/// `GET /students/{student_id}`
pub async fn get_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Student>> {
    let id = parse_student_id(&raw_id)?;
    let student = run_blocking(&state, move |service| service.get_by_id(id)).await?;
    Ok(Json(student))
}

/// `POST /students`
pub async fn create_student(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let input = parse_student_body(&body)?;
    let student = run_blocking(&state, move |service| service.create(&input)).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// `PUT /students/{student_id}`
pub async fn update_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Student>> {
    let id = parse_student_id(&raw_id)?;
    let input = parse_student_body(&body)?;
    let student = run_blocking(&state, move |service| service.update(id, &input)).await?;
    Ok(Json(student))
}

/// `DELETE /students/{student_id}`
pub async fn delete_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_student_id(&raw_id)?;
    let confirmation = run_blocking(&state, move |service| service.delete(id)).await?;
    Ok(Json(MessageResponse {
        message: confirmation.message(),
    }))
}

fn parse_student_id(raw: &str) -> ApiResult<StudentId> {
    raw.parse::<StudentId>()
        .map_err(|_| ApiError::InvalidId(raw.to_string()))
}

fn parse_student_body(body: &[u8]) -> ApiResult<StudentInput> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|err| ValidationError::invalid_json(err.to_string()))?;
    Ok(validate_student_payload(&payload)?)
}

async fn run_blocking<T, F>(state: &AppState, work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&StudentService) -> RepoResult<T> + Send + 'static,
{
    let service = state.students.clone();
    let result = tokio::task::spawn_blocking(move || work(&service)).await?;
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::{parse_student_body, parse_student_id};
    use crate::error::ApiError;
    use student_core::IssueKind;

    #[test]
    fn student_id_must_be_an_integer() {
        assert_eq!(parse_student_id("42").unwrap(), 42);
        assert!(matches!(
            parse_student_id("abc"),
            Err(ApiError::InvalidId(raw)) if raw == "abc"
        ));
    }

    #[test]
    fn malformed_json_is_a_body_level_issue() {
        let err = parse_student_body(b"{\"name\": ").unwrap_err();
        let ApiError::Validation(err) = err else {
            panic!("expected validation error");
        };
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].field, None);
        assert!(matches!(err.issues()[0].kind, IssueKind::InvalidJson { .. }));
    }
}
