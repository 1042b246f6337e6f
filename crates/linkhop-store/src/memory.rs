use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use linkhop_core::store::Result;
use linkhop_core::{
    InvalidationMessage, InvalidationSource, LongUrl, MappingStore, ShortCode, StoreError,
    Subscription,
};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
struct Inner {
    entries: DashMap<ShortCode, LongUrl>,
    events: broadcast::Sender<String>,
    available: AtomicBool,
}

/// An in-process implementation of the store contracts.
///
/// Cloning a `MemoryStore` yields another handle to the same data and the
/// same broadcast channel, so several repositories built from clones behave
/// like instances sharing one Redis. Availability can be toggled to
/// simulate an outage.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                events,
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Makes every subsequent operation fail with a connection error
    /// (`false`) or succeed again (`true`).
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    fn ensure_available(&self, operation: &str) -> Result<()> {
        if self.inner.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Connection(format!(
                "{operation}: store unavailable"
            )))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MappingStore for MemoryStore {
    async fn get(&self, code: &ShortCode) -> Result<LongUrl> {
        self.ensure_available("get")?;
        self.inner
            .entries
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    async fn set_if_absent(&self, code: &ShortCode, url: &LongUrl) -> Result<()> {
        self.ensure_available("set_if_absent")?;
        match self.inner.entries.entry(code.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(code.to_string())),
            Entry::Vacant(vacant) => {
                vacant.insert(url.clone());
                Ok(())
            }
        }
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        self.ensure_available("delete")?;
        if self.inner.entries.remove(code).is_none() {
            trace!(code = %code, "delete of absent code, nothing to publish");
            return Ok(false);
        }

        let message = InvalidationMessage::delete(code.clone()).encode();
        // A send error only means nobody is subscribed right now.
        let receivers = self.inner.events.send(message).unwrap_or(0);
        debug!(code = %code, receivers, "published delete message");
        Ok(true)
    }

    async fn scan_all(
        &self,
        callback: &mut (dyn FnMut(ShortCode, LongUrl) -> ControlFlow<()> + Send),
    ) -> Result<usize> {
        self.ensure_available("scan_all")?;
        let snapshot: Vec<(ShortCode, LongUrl)> = self
            .inner
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut visited = 0;
        for (code, url) in snapshot {
            visited += 1;
            if callback(code, url).is_break() {
                break;
            }
        }
        Ok(visited)
    }
}

#[async_trait]
impl InvalidationSource for MemoryStore {
    async fn connect(&self) -> Result<Box<dyn Subscription>> {
        self.ensure_available("subscribe")?;
        Ok(Box::new(MemorySubscription {
            store: self.clone(),
            receiver: self.inner.events.subscribe(),
        }))
    }
}

struct MemorySubscription {
    store: MemoryStore,
    receiver: broadcast::Receiver<String>,
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn next_message(&mut self) -> Result<String> {
        match self.receiver.recv().await {
            Ok(message) => Ok(message),
            Err(broadcast::error::RecvError::Lagged(skipped)) => Err(StoreError::Connection(
                format!("subscriber lagged behind by {skipped} messages"),
            )),
            Err(broadcast::error::RecvError::Closed) => Err(StoreError::Connection(
                "broadcast channel closed".to_string(),
            )),
        }
    }

    async fn ping(&mut self) -> Result<()> {
        self.store.ensure_available("ping")
    }
}
