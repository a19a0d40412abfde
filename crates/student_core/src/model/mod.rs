//! Student domain model and input validation.
//!
//! # Responsibility
//! - Define the canonical student shapes used by every other layer.
//! - Convert untrusted payloads into well-formed inputs.
//!
//! # Invariants
//! - Field names and limits are declared once in `student` and reused elsewhere.

pub mod student;
pub mod validate;
