// Vaidya Infrastructure - SQLite Adapter
// Implements: QueueRepository, TransactionalQueueRepository, AuditLog

mod audit_log;
mod connection;
mod error;
mod migration;
mod queue_repository;
mod rows;
mod transaction;

pub use audit_log::SqliteAuditLog;
pub use connection::create_pool;
pub use error::map_sqlx_error;
pub use migration::run_migrations;
pub use queue_repository::SqliteQueueRepository;
pub use transaction::SqliteQueueTransaction;

// Note: sqlx::Error conversion is handled by map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
