//! Payload validation for student writes.
//!
//! # Responsibility
//! - Turn an untyped JSON payload into a `StudentInput` or reject it.
//! - Report every failing field in one pass so callers can show all problems.
//!
//! # Invariants
//! - Pure and synchronous: no I/O, no store access.
//! - Unknown keys (including a client-supplied `id`) are ignored.
//! - Text values are kept exactly as supplied.

use super::student::{check_text, fields, max_len_for, StudentInput};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Why a single field (or the whole body) was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Key absent or `null`.
    Missing,
    /// Present with the wrong JSON type.
    WrongType { expected: &'static str },
    /// Text field is empty or made only of blank chars.
    Empty,
    /// Text field contains a NUL char.
    ContainsNul,
    /// Text field exceeds its char limit.
    TooLong { max: usize, actual: usize },
    /// Body parsed but is not a JSON object.
    NotAnObject,
    /// Body bytes are not valid JSON.
    InvalidJson { message: String },
}

impl IssueKind {
    /// Stable machine-readable code for this issue.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::WrongType { expected: "integer" } => "int_type",
            Self::WrongType { .. } => "string_type",
            Self::Empty => "string_too_short",
            Self::ContainsNul => "string_nul",
            Self::TooLong { .. } => "string_too_long",
            Self::NotAnObject => "model_type",
            Self::InvalidJson { .. } => "json_invalid",
        }
    }
}

impl Display for IssueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "Field required"),
            Self::WrongType { expected } => write!(f, "Input should be a valid {expected}"),
            Self::Empty => write!(f, "String should not be empty"),
            Self::ContainsNul => write!(f, "String should not contain NUL characters"),
            Self::TooLong { max, .. } => {
                write!(f, "String should have at most {max} characters")
            }
            Self::NotAnObject => write!(f, "Input should be a valid object"),
            Self::InvalidJson { message } => write!(f, "JSON decode error: {message}"),
        }
    }
}

/// One rejected field. `field == None` means the body as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: Option<&'static str>,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn field(field: &'static str, kind: IssueKind) -> Self {
        Self {
            field: Some(field),
            kind,
        }
    }

    pub fn body(kind: IssueKind) -> Self {
        Self { field: None, kind }
    }
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.field {
            Some(field) => write!(f, "{field}: {}", self.kind),
            None => write!(f, "body: {}", self.kind),
        }
    }
}

/// Rejected student input with every failing field listed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid student input: {}", describe(.issues))]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    /// Body bytes could not be parsed as JSON.
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::new(vec![FieldIssue::body(IssueKind::InvalidJson {
            message: message.into(),
        })])
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Returns the issue recorded for `field`, if any.
    pub fn issue_for(&self, field: &str) -> Option<&IssueKind> {
        self.issues
            .iter()
            .find(|issue| issue.field == Some(field))
            .map(|issue| &issue.kind)
    }

    pub(crate) fn from_issues(issues: Vec<FieldIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self::new(issues))
        }
    }
}

fn describe(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates an untyped payload into a `StudentInput`.
///
/// # Errors
/// - `ValidationError` listing each missing, wrong-typed, empty or too-long field.
pub fn validate_student_payload(payload: &Value) -> Result<StudentInput, ValidationError> {
    let Some(object) = payload.as_object() else {
        return Err(ValidationError::new(vec![FieldIssue::body(
            IssueKind::NotAnObject,
        )]));
    };

    let mut issues = Vec::new();
    let name = text_field(object, fields::NAME, &mut issues);
    let age = integer_field(object, fields::AGE, &mut issues);
    let address = text_field(object, fields::ADDRESS, &mut issues);
    let email = text_field(object, fields::EMAIL, &mut issues);

    match (name, age, address, email) {
        (Some(name), Some(age), Some(address), Some(email)) if issues.is_empty() => {
            Ok(StudentInput {
                name,
                age,
                address,
                email,
            })
        }
        _ => Err(ValidationError::new(issues)),
    }
}

fn text_field(
    object: &Map<String, Value>,
    field: &'static str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => {
            issues.push(FieldIssue::field(field, IssueKind::Missing));
            None
        }
        Some(Value::String(text)) => {
            let before = issues.len();
            let max_len = max_len_for(field).unwrap_or(usize::MAX);
            check_text(issues, field, text, max_len);
            (issues.len() == before).then(|| text.clone())
        }
        Some(_) => {
            issues.push(FieldIssue::field(
                field,
                IssueKind::WrongType { expected: "string" },
            ));
            None
        }
    }
}

fn integer_field(
    object: &Map<String, Value>,
    field: &'static str,
    issues: &mut Vec<FieldIssue>,
) -> Option<i64> {
    match object.get(field) {
        None | Some(Value::Null) => {
            issues.push(FieldIssue::field(field, IssueKind::Missing));
            None
        }
        Some(value) => match value.as_i64() {
            Some(number) => Some(number),
            None => {
                issues.push(FieldIssue::field(
                    field,
                    IssueKind::WrongType {
                        expected: "integer",
                    },
                ));
                None
            }
        },
    }
}
