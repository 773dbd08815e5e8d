// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid entry status transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid priority: {0} (allowed range {min}..={max})", min = crate::domain::MIN_PRIORITY, max = crate::domain::MAX_PRIORITY)]
    InvalidPriority(i32),

    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
