//! Core types and traits for the linkhop URL shortener.
//!
//! This crate provides the vocabulary shared by the cache, store,
//! repository and gateway crates: validated short codes and long URLs,
//! the invalidation wire message, the error taxonomy and the persistent
//! store contracts.

pub mod error;
pub mod message;
pub mod shortcode;
pub mod store;
pub mod url;

pub use error::{StoreError, ValidationError};
pub use message::InvalidationMessage;
pub use shortcode::ShortCode;
pub use store::{InvalidationSource, MappingStore, Subscription};
pub use url::LongUrl;
