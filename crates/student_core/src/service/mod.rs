//! Core use-case services.
//!
//! # Responsibility
//! - Wrap repository calls in one transaction per operation.
//! - Keep the HTTP layer decoupled from sessions and SQL.

pub mod student_service;
