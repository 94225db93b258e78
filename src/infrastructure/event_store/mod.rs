//! Event stores for deduplicated open registration.
//!
//! Provides two [`EmailEventStorage`](crate::domain::repositories::EmailEventStorage)
//! implementations:
//! - [`RedisEventStorage`] - Shared, Redis-backed store for multi-instance deployments
//! - [`InMemoryEventStorage`] - Process-local store for development and tests

mod memory_store;
mod redis_store;

pub use memory_store::InMemoryEventStorage;
pub use redis_store::RedisEventStorage;
