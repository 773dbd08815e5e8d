// sqlx::Error -> AppError mapping

use vaidya_core::error::AppError;

/// Convert sqlx::Error to AppError with structured information
///
/// Unique violations on the active-queue / active-patient indexes become the
/// matching domain conflicts; BUSY/LOCKED become `ConcurrencyConflict`.
pub fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message();
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => {
                        // UNIQUE constraint failed
                        if message.contains("queues.") || message.contains("idx_queues_active_pair")
                        {
                            AppError::DuplicateQueue(format!(
                                "Active queue already exists: {}",
                                message
                            ))
                        } else if message.contains("queue_entries.")
                            || message.contains("idx_entries_active_patient")
                        {
                            AppError::DuplicateEntry(format!(
                                "Patient already active in queue: {}",
                                message
                            ))
                        } else {
                            AppError::Database(format!(
                                "Unique constraint violation: {} ({})",
                                message, code_str
                            ))
                        }
                    }
                    "787" | "3850" => AppError::Database(format!(
                        "Foreign key constraint violation: {} ({})",
                        message, code_str
                    )),
                    // SQLITE_BUSY, SQLITE_LOCKED and their extended codes
                    "5" | "6" | "261" | "262" | "517" => AppError::ConcurrencyConflict(format!(
                        "Database busy ({}): {}",
                        code_str, message
                    )),
                    "13" => AppError::Database(format!("Database full: {}", message)),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str, message
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", message))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        sqlx::Error::ColumnDecode { index, source } => {
            AppError::Database(format!("Failed to decode column {}: {}", index, source))
        }
        _ => {
            // Connection, pool, protocol errors
            AppError::Database(err.to_string())
        }
    }
}
