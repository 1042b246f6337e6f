use crate::error::StoreError;
use crate::shortcode::ShortCode;
use crate::url::LongUrl;
use async_trait::async_trait;
use std::ops::ControlFlow;

pub type Result<T> = std::result::Result<T, StoreError>;

/// The shared, authoritative home of all mappings.
///
/// Every service instance talks to the same logical store. Uniqueness of
/// short codes is enforced here, through the backend's native conditional
/// write, and never by client-side locking.
#[async_trait]
pub trait MappingStore: Send + Sync + 'static {
    /// Looks up the long URL for `code`.
    ///
    /// Returns [`StoreError::NotFound`] on a miss, distinct from
    /// [`StoreError::Connection`].
    async fn get(&self, code: &ShortCode) -> Result<LongUrl>;

    /// Atomically inserts the mapping if the code is free.
    ///
    /// Returns [`StoreError::AlreadyExists`] when the code is taken; an
    /// existing record is never overwritten.
    async fn set_if_absent(&self, code: &ShortCode, url: &LongUrl) -> Result<()>;

    /// Deletes the mapping and broadcasts an invalidation for it.
    ///
    /// Returns `Ok(false)` without broadcasting when nothing was stored
    /// under `code`.
    async fn delete(&self, code: &ShortCode) -> Result<bool>;

    /// Visits every stored mapping until the callback breaks.
    ///
    /// Returns the number of pairs handed to the callback.
    async fn scan_all(
        &self,
        callback: &mut (dyn FnMut(ShortCode, LongUrl) -> ControlFlow<()> + Send),
    ) -> Result<usize>;
}

/// Something that can open a subscription to the invalidation channel.
#[async_trait]
pub trait InvalidationSource: Send + Sync + 'static {
    async fn connect(&self) -> Result<Box<dyn Subscription>>;
}

/// A live subscription to the invalidation channel.
#[async_trait]
pub trait Subscription: Send {
    /// Waits for the next raw message. Any error means the subscription
    /// is dead and must be re-established.
    async fn next_message(&mut self) -> Result<String>;

    /// Lightweight liveness probe.
    async fn ping(&mut self) -> Result<()>;
}
