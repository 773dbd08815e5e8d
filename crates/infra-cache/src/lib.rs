// Vaidya Infrastructure - In-process Cache
// Implements: Cache

mod moka_cache;

pub use moka_cache::MokaCache;
