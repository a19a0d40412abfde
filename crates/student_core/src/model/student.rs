//! Student domain model.
//!
//! # Responsibility
//! - Define the input shape accepted from callers and the persisted output shape.
//! - Own field names and length limits shared by validation and persistence.
//!
//! # Invariants
//! - `id` is assigned by the store exactly once and never taken from input.
//! - `name`, `address` and `email` hold at least one non-blank char, no NUL,
//!   and stay within their char limits.

use super::validate::{FieldIssue, IssueKind, ValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned row identifier.
pub type StudentId = i64;

/// Wire and column names for student fields.
pub mod fields {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const AGE: &str = "age";
    pub const ADDRESS: &str = "address";
    pub const EMAIL: &str = "email";

    /// Business fields in declaration order.
    pub const BUSINESS: [&str; 4] = [NAME, AGE, ADDRESS, EMAIL];
}

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_ADDRESS_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 100;

/// Characters that do not count as content: tab, LF, VT, FF, CR and space.
///
/// A text field made only of these is blank. The `students` CHECK
/// constraints strip the same set (`char(9, 10, 11, 12, 13, 32)`).
pub const BLANK_CHARS: [char; 6] = ['\t', '\n', '\u{0B}', '\u{0C}', '\r', ' '];

/// Business fields of a student, without identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInput {
    pub name: String,
    pub age: i64,
    pub address: String,
    pub email: String,
}

/// A persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub age: i64,
    pub address: String,
    pub email: String,
}

impl StudentInput {
    pub fn new(
        name: impl Into<String>,
        age: i64,
        address: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            address: address.into(),
            email: email.into(),
        }
    }

    /// Checks text constraints on an already-typed input.
    ///
    /// Repository write paths call this before any SQL mutation, and read paths
    /// call it on every decoded row.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_text(&mut issues, fields::NAME, &self.name, MAX_NAME_LEN);
        check_text(&mut issues, fields::ADDRESS, &self.address, MAX_ADDRESS_LEN);
        check_text(&mut issues, fields::EMAIL, &self.email, MAX_EMAIL_LEN);
        ValidationError::from_issues(issues)
    }

    /// Attaches a store-assigned id, producing the output shape.
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            age: self.age,
            address: self.address,
            email: self.email,
        }
    }
}

impl Student {
    /// Returns the business fields, dropping identity.
    pub fn to_input(&self) -> StudentInput {
        StudentInput {
            name: self.name.clone(),
            age: self.age,
            address: self.address.clone(),
            email: self.email.clone(),
        }
    }
}

/// Returns the char limit for a text field, or `None` for non-text fields.
pub fn max_len_for(field: &str) -> Option<usize> {
    match field {
        fields::NAME => Some(MAX_NAME_LEN),
        fields::ADDRESS => Some(MAX_ADDRESS_LEN),
        fields::EMAIL => Some(MAX_EMAIL_LEN),
        _ => None,
    }
}

pub(crate) fn check_text(
    issues: &mut Vec<FieldIssue>,
    field: &'static str,
    value: &str,
    max_len: usize,
) {
    if value.contains('\0') {
        issues.push(FieldIssue::field(field, IssueKind::ContainsNul));
        return;
    }
    if is_blank(value) {
        issues.push(FieldIssue::field(field, IssueKind::Empty));
        return;
    }
    let len = value.chars().count();
    if len > max_len {
        issues.push(FieldIssue::field(
            field,
            IssueKind::TooLong { max: max_len, actual: len },
        ));
    }
}

/// Whether `value` has no characters outside [`BLANK_CHARS`].
pub fn is_blank(value: &str) -> bool {
    value.trim_matches(&BLANK_CHARS[..]).is_empty()
}
