//! HTTP surface for the student registry.
//!
//! # Responsibility
//! - Expose the five student operations over axum.
//! - Map core results to status codes and JSON bodies.
//!
//! # Invariants
//! - Handlers never touch SQL; all store access goes through `StudentService`.
//! - Store work runs on the blocking pool, never on async worker threads.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

use std::sync::Arc;
use student_core::{SessionFactory, StudentService};

pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use server::{serve, shutdown_signal};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub students: StudentService,
}

impl AppState {
    pub fn new(sessions: Arc<SessionFactory>) -> Self {
        Self {
            students: StudentService::new(sessions),
        }
    }
}
