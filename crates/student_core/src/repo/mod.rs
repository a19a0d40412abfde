//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for student records.
//! - Isolate SQLite statement details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `StudentInput::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to store transport errors.

pub mod student_repo;
