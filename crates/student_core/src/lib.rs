//! Core domain logic for the student registry.
//! This crate is the single source of truth for student invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{Session, SessionFactory, StoreError, StoreResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::student::{Student, StudentId, StudentInput};
pub use model::validate::{validate_student_payload, FieldIssue, IssueKind, ValidationError};
pub use repo::student_repo::{
    RepoError, RepoResult, SqliteStudentRepository, StudentRepository,
};
pub use service::student_service::{DeleteConfirmation, StudentService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
