//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use vaidya_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const DUPLICATE_QUEUE: i32 = 4004;
    pub const QUEUE_INACTIVE: i32 = 4005;
    pub const CAPACITY_EXCEEDED: i32 = 4006;
    pub const DUPLICATE_ENTRY: i32 = 4007;
    pub const CONCURRENCY_CONFLICT: i32 = 4009;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let code = error_code(&err);
    let message = match err {
        AppError::NotFound(msg)
        | AppError::DuplicateQueue(msg)
        | AppError::QueueInactive(msg)
        | AppError::CapacityExceeded(msg)
        | AppError::DuplicateEntry(msg)
        | AppError::Validation(msg)
        | AppError::ConcurrencyConflict(msg)
        | AppError::Database(msg)
        | AppError::Config(msg)
        | AppError::Internal(msg) => msg,
        AppError::Domain(e) => e.to_string(),
        AppError::Serialization(e) => e.to_string(),
    };
    ErrorObjectOwned::owned(code, message, None::<()>)
}

/// JSON-RPC code for an application error
pub fn error_code(err: &AppError) -> i32 {
    match err {
        AppError::Validation(_) | AppError::Domain(_) | AppError::Serialization(_) => {
            code::VALIDATION_ERROR
        }
        AppError::NotFound(_) => code::NOT_FOUND,
        AppError::DuplicateQueue(_) => code::DUPLICATE_QUEUE,
        AppError::QueueInactive(_) => code::QUEUE_INACTIVE,
        AppError::CapacityExceeded(_) => code::CAPACITY_EXCEEDED,
        AppError::DuplicateEntry(_) => code::DUPLICATE_ENTRY,
        AppError::ConcurrencyConflict(_) => code::CONCURRENCY_CONFLICT,
        AppError::Database(_) => code::DB_ERROR,
        AppError::Config(_) | AppError::Internal(_) => code::INTERNAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaidya_core::domain::DomainError;

    #[test]
    fn test_domain_errors_map_to_codes() {
        let cases = [
            (AppError::NotFound("x".into()), code::NOT_FOUND),
            (AppError::DuplicateQueue("x".into()), code::DUPLICATE_QUEUE),
            (AppError::QueueInactive("x".into()), code::QUEUE_INACTIVE),
            (AppError::CapacityExceeded("x".into()), code::CAPACITY_EXCEEDED),
            (AppError::DuplicateEntry("x".into()), code::DUPLICATE_ENTRY),
            (AppError::Validation("x".into()), code::VALIDATION_ERROR),
            (
                AppError::ConcurrencyConflict("x".into()),
                code::CONCURRENCY_CONFLICT,
            ),
            (AppError::Database("x".into()), code::DB_ERROR),
            (AppError::Internal("x".into()), code::INTERNAL_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(to_rpc_error(err).code(), expected);
        }
    }

    #[test]
    fn test_invalid_transition_is_validation_error() {
        let err = AppError::Domain(DomainError::InvalidStateTransition {
            from: "COMPLETED".into(),
            to: "IN_PROGRESS".into(),
        });
        let rpc = to_rpc_error(err);
        assert_eq!(rpc.code(), code::VALIDATION_ERROR);
        assert!(rpc.message().contains("COMPLETED -> IN_PROGRESS"));
    }
}
