//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD statements over the `students` table.
//! - Map rows to `Student` values and store failures to semantic errors.
//!
//! # Invariants
//! - Every caller-supplied value is a bound parameter.
//! - Write paths call `StudentInput::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - A unique-constraint hit on `email` surfaces as `RepoError::Conflict`.

use crate::db::StoreError;
use crate::model::student::{Student, StudentId, StudentInput};
use crate::model::validate::ValidationError;
use rusqlite::{params, Connection, OptionalExtension, Row};

const STUDENT_SELECT_SQL: &str = "SELECT id, name, age, address, email FROM students";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by student persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("student not found: {0}")]
    NotFound(StudentId),
    #[error("email already registered to another student")]
    Conflict,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid persisted student data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if is_unique_violation(&value) {
            Self::Conflict
        } else {
            Self::Store(StoreError::Sqlite(value))
        }
    }
}

impl RepoError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::Conflict => "email_conflict",
            Self::Store(StoreError::Closed) => "store_closed",
            Self::Store(_) => "store_failed",
            Self::InvalidData(_) => "invalid_persisted_data",
        }
    }
}

/// Repository interface for student CRUD statements.
///
/// Implementations run inside a caller-owned transaction; they never commit.
pub trait StudentRepository {
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn insert_student(&self, input: &StudentInput) -> RepoResult<Student>;
    fn update_student(&self, id: StudentId, input: &StudentInput) -> RepoResult<Student>;
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
    /// Whether `email` belongs to any row other than `except`.
    fn email_in_use(&self, email: &str, except: Option<StudentId>) -> RepoResult<bool>;
}

/// SQLite-backed student repository bound to one connection or transaction.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn exists(&self, id: StudentId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM students WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn insert_student(&self, input: &StudentInput) -> RepoResult<Student> {
        input.validate()?;

        self.conn.execute(
            "INSERT INTO students (name, age, address, email) VALUES (?1, ?2, ?3, ?4);",
            params![
                input.name.as_str(),
                input.age,
                input.address.as_str(),
                input.email.as_str(),
            ],
        )?;

        Ok(input.clone().into_student(self.conn.last_insert_rowid()))
    }

    fn update_student(&self, id: StudentId, input: &StudentInput) -> RepoResult<Student> {
        input.validate()?;

        if !self.exists(id)? {
            return Err(RepoError::NotFound(id));
        }
        if self.email_in_use(&input.email, Some(id))? {
            return Err(RepoError::Conflict);
        }

        let changed = self.conn.execute(
            "UPDATE students
             SET
                name = ?1,
                age = ?2,
                address = ?3,
                email = ?4
             WHERE id = ?5;",
            params![
                input.name.as_str(),
                input.age,
                input.address.as_str(),
                input.email.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(input.clone().into_student(id))
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn email_in_use(&self, email: &str, except: Option<StudentId>) -> RepoResult<bool> {
        let owner: Option<StudentId> = self
            .conn
            .query_row(
                "SELECT id FROM students WHERE email = ?1;",
                [email],
                |row| row.get(0),
            )
            .optional()?;

        Ok(match (owner, except) {
            (Some(owner), Some(except)) => owner != except,
            (Some(_), None) => true,
            (None, _) => false,
        })
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id: StudentId = row.get("id")?;
    let input = StudentInput {
        name: row.get("name")?,
        age: row.get("age")?,
        address: row.get("address")?,
        email: row.get("email")?,
    };
    input
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("students.id={id}: {err}")))?;
    Ok(input.into_student(id))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
