//! Domain error types

use crate::estimation::ids::TaskId;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A vote was submitted for a task with no team members, so the
    /// round-completion check has nothing to count against.
    #[error("Task {0} has no team members; rounds cannot complete")]
    EmptyTeam(TaskId),

    #[error("Unknown estimate unit: {0}")]
    InvalidUnit(String),

    #[error("Unknown estimate unit code: {0}")]
    InvalidUnitCode(u8),

    #[error("Invalid name: {0}")]
    InvalidName(String),
}

impl DomainError {
    /// Check if this error describes an invalid state rather than bad input
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, DomainError::EmptyTeam(_))
    }
}
