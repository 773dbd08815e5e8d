// Port Layer - Interfaces for external collaborators

pub mod audit;
pub mod cache;
pub mod id_provider; // For deterministic testing
pub mod queue_repository;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use audit::{AuditEvent, AuditLog, AuditOperation};
pub use cache::{cache_keys, Cache};
pub use id_provider::IdProvider;
pub use queue_repository::QueueRepository;
pub use time_provider::TimeProvider;
pub use transaction::{QueueRepositoryTransaction, Transaction, TransactionalQueueRepository};
