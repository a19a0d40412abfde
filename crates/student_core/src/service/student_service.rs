//! Student use-case service.
//!
//! # Responsibility
//! - Provide the five student operations as atomic units of work.
//! - Own the session lifecycle: acquire, begin, act, commit or roll back, release.
//!
//! # Invariants
//! - Each operation opens exactly one session and one transaction.
//! - Any failure rolls the transaction back in full before returning.
//! - Success is committed before the result is returned.
//! - The session is dropped on every exit path.

use crate::db::SessionFactory;
use crate::model::student::{Student, StudentId, StudentInput};
use crate::repo::student_repo::{
    RepoError, RepoResult, SqliteStudentRepository, StudentRepository,
};
use log::{error, info, warn};
use rusqlite::TransactionBehavior;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Result of a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteConfirmation {
    pub id: StudentId,
}

impl DeleteConfirmation {
    /// Human-readable confirmation naming the deleted id.
    pub fn message(&self) -> String {
        format!("Student with ID {} deleted", self.id)
    }
}

/// Transactional entry points for student CRUD.
///
/// Cheap to share: holds only a handle to the process-wide session factory.
#[derive(Debug, Clone)]
pub struct StudentService {
    sessions: Arc<SessionFactory>,
}

impl StudentService {
    pub fn new(sessions: Arc<SessionFactory>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionFactory> {
        &self.sessions
    }

    /// Lists every student in insertion order.
    pub fn list_all(&self) -> RepoResult<Vec<Student>> {
        self.unit_of_work(
            "student_list",
            None,
            TransactionBehavior::Deferred,
            |repo| repo.list_students(),
        )
    }

    /// Gets one student, or `RepoError::NotFound`.
    pub fn get_by_id(&self, id: StudentId) -> RepoResult<Student> {
        self.unit_of_work(
            "student_get",
            Some(id),
            TransactionBehavior::Deferred,
            |repo| repo.get_student(id)?.ok_or(RepoError::NotFound(id)),
        )
    }

    /// Inserts a student and returns it with its store-assigned id.
    ///
    /// # Errors
    /// - `RepoError::Conflict` when the email is already registered.
    pub fn create(&self, input: &StudentInput) -> RepoResult<Student> {
        self.unit_of_work(
            "student_create",
            None,
            TransactionBehavior::Immediate,
            |repo| repo.insert_student(input),
        )
    }

    /// Replaces all business fields of an existing student.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when no row has `id`.
    /// - `RepoError::Conflict` when another student already has the email.
    pub fn update(&self, id: StudentId, input: &StudentInput) -> RepoResult<Student> {
        self.unit_of_work(
            "student_update",
            Some(id),
            TransactionBehavior::Immediate,
            |repo| repo.update_student(id, input),
        )
    }

    /// Hard-deletes a student.
    pub fn delete(&self, id: StudentId) -> RepoResult<DeleteConfirmation> {
        self.unit_of_work(
            "student_delete",
            Some(id),
            TransactionBehavior::Immediate,
            |repo| {
                repo.delete_student(id)?;
                Ok(DeleteConfirmation { id })
            },
        )
    }

    fn unit_of_work<T>(
        &self,
        event: &'static str,
        id: Option<StudentId>,
        behavior: TransactionBehavior,
        work: impl FnOnce(&SqliteStudentRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let result = self.run_in_transaction(behavior, work);
        let id = id.map_or_else(|| "-".to_string(), |id| id.to_string());

        match &result {
            Ok(_) => info!(
                "event={} module=service status=ok id={} duration_ms={}",
                event,
                id,
                started_at.elapsed().as_millis()
            ),
            Err(err @ (RepoError::Store(_) | RepoError::InvalidData(_))) => error!(
                "event={} module=service status=error id={} duration_ms={} error_code={} error={}",
                event,
                id,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
            Err(err) => warn!(
                "event={} module=service status=rejected id={} duration_ms={} error_code={}",
                event,
                id,
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }

        result
    }

    fn run_in_transaction<T>(
        &self,
        behavior: TransactionBehavior,
        work: impl FnOnce(&SqliteStudentRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut conn = self.sessions.session()?;
        let tx = conn.transaction_with_behavior(behavior)?;

        let outcome = {
            let repo = SqliteStudentRepository::new(&tx);
            work(&repo)
        };

        match outcome {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=transaction_rollback module=service status=error error_code=rollback_failed error={}",
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }
}
