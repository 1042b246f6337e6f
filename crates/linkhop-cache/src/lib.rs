//! Process-local caches layered over the shared store.

pub mod bounded;
pub mod cache;
pub mod configured;
pub mod memory;

pub use bounded::BoundedCache;
pub use cache::LocalCache;
pub use configured::ConfiguredCache;
pub use memory::MemoryCache;
