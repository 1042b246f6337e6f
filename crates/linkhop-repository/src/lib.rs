//! The repository layer: a process-local cache kept consistent with a
//! shared store across instances.
//!
//! [`Repository`] serves get/put/delete against its [`LocalCache`] and an
//! optional [`MappingStore`]. Deletions made by any instance are broadcast
//! by the store; the [`InvalidationListener`] running in every process
//! turns those broadcasts into local evictions.
//!
//! [`LocalCache`]: linkhop_cache::LocalCache
//! [`MappingStore`]: linkhop_core::MappingStore

pub mod error;
pub mod listener;
pub mod repository;

pub use error::{RepositoryError, Result};
pub use listener::{InvalidationListener, ListenerHandle, ListenerSettings, ListenerState};
pub use repository::{Repository, RepositorySettings, MIN_CODE_LENGTH};
