// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// The first seven variants are the error kinds surfaced to API callers.
/// Nothing here is retried inside the core.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate queue: {0}")]
    DuplicateQueue(String),

    #[error("Queue inactive: {0}")]
    QueueInactive(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by mapping to AppError::Database / DuplicateQueue / ConcurrencyConflict
