// Application Layer - Use Cases and Business Logic

pub mod engine;
pub mod hooks;
pub mod locks;
pub mod registry;

// Re-exports
pub use engine::{AddEntryRequest, QueueEngine, ReorderSummary};
pub use hooks::{Mutation, MutationHooks, ReadCache};
pub use locks::QueueLocks;
pub use registry::{CreateQueueRequest, QueueRegistry};
