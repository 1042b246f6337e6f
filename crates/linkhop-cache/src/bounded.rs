use crate::LocalCache;
use linkhop_core::{LongUrl, ShortCode};
use moka::sync::Cache;
use tracing::trace;

/// Capacity-bounded local cache backed by Moka.
///
/// Moka evicts entries when the cache is full. Eviction only ever drops
/// entries, so the cache stays a subset of the store; a later `get` simply
/// falls through to the store again.
#[derive(Debug, Clone)]
pub struct BoundedCache {
    entries: Cache<ShortCode, LongUrl>,
}

impl BoundedCache {
    /// Creates a cache holding at most `max_capacity` entries.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_capacity).build(),
        }
    }
}

impl LocalCache for BoundedCache {
    fn get(&self, code: &ShortCode) -> Option<LongUrl> {
        let hit = self.entries.get(code);
        trace!(code = %code, hit = hit.is_some(), "bounded cache lookup");
        hit
    }

    fn set_if_absent(&self, code: &ShortCode, url: &LongUrl) -> bool {
        self.entries
            .entry(code.clone())
            .or_insert(url.clone())
            .is_fresh()
    }

    fn insert(&self, code: &ShortCode, url: &LongUrl) {
        self.entries.insert(code.clone(), url.clone());
    }

    fn remove(&self, code: &ShortCode) {
        self.entries.invalidate(code);
    }

    fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }
}
