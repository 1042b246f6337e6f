//! Persistent store adapters.
//!
//! [`RedisStore`] is the production backend: mappings live in one Redis
//! hash and deletions are broadcast over Redis pub/sub. [`MemoryStore`]
//! keeps the same contract inside a single process and is what the
//! repository tests use to stand up several instances over one store.

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::{RedisStore, StoreSettings};
