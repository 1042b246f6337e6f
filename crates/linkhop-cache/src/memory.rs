use crate::LocalCache;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use linkhop_core::{LongUrl, ShortCode};
use tracing::trace;

/// Unbounded local cache backed by [`DashMap`].
///
/// DashMap shards its locks, so reads and writes to different codes do not
/// block each other. There is no eviction and no TTL: entries live until
/// they are removed by a local delete or an invalidation message.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<ShortCode, LongUrl>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
        }
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, code: &ShortCode) -> Option<LongUrl> {
        let hit = self.entries.get(code).map(|entry| entry.value().clone());
        trace!(code = %code, hit = hit.is_some(), "local cache lookup");
        hit
    }

    fn set_if_absent(&self, code: &ShortCode, url: &LongUrl) -> bool {
        match self.entries.entry(code.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(url.clone());
                true
            }
        }
    }

    fn insert(&self, code: &ShortCode, url: &LongUrl) {
        self.entries.insert(code.clone(), url.clone());
    }

    fn remove(&self, code: &ShortCode) {
        self.entries.remove(code);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
