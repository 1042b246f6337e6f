use crate::{BoundedCache, LocalCache, MemoryCache};
use linkhop_core::{LongUrl, ShortCode};

/// The local cache chosen at startup.
#[derive(Debug)]
pub enum ConfiguredCache {
    Unbounded(MemoryCache),
    Bounded(BoundedCache),
}

impl ConfiguredCache {
    /// `None` keeps every entry; `Some(n)` evicts beyond `n` entries.
    pub fn new(capacity: Option<u64>) -> Self {
        match capacity {
            Some(capacity) => ConfiguredCache::Bounded(BoundedCache::with_capacity(capacity)),
            None => ConfiguredCache::Unbounded(MemoryCache::new()),
        }
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self, ConfiguredCache::Bounded(_))
    }
}

impl LocalCache for ConfiguredCache {
    fn get(&self, code: &ShortCode) -> Option<LongUrl> {
        match self {
            ConfiguredCache::Unbounded(cache) => cache.get(code),
            ConfiguredCache::Bounded(cache) => cache.get(code),
        }
    }

    fn set_if_absent(&self, code: &ShortCode, url: &LongUrl) -> bool {
        match self {
            ConfiguredCache::Unbounded(cache) => cache.set_if_absent(code, url),
            ConfiguredCache::Bounded(cache) => cache.set_if_absent(code, url),
        }
    }

    fn insert(&self, code: &ShortCode, url: &LongUrl) {
        match self {
            ConfiguredCache::Unbounded(cache) => cache.insert(code, url),
            ConfiguredCache::Bounded(cache) => cache.insert(code, url),
        }
    }

    fn remove(&self, code: &ShortCode) {
        match self {
            ConfiguredCache::Unbounded(cache) => cache.remove(code),
            ConfiguredCache::Bounded(cache) => cache.remove(code),
        }
    }

    fn len(&self) -> usize {
        match self {
            ConfiguredCache::Unbounded(cache) => cache.len(),
            ConfiguredCache::Bounded(cache) => cache.len(),
        }
    }
}
