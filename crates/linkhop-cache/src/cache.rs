use linkhop_core::{LongUrl, ShortCode};

/// A per-instance, in-memory projection of the store's mappings.
///
/// Implementations must be safe for concurrent readers, writers and
/// removers without any locking by the caller. An entry may be missing
/// when the store has it, but must never disagree with the store.
pub trait LocalCache: Send + Sync + 'static {
    /// Returns the cached long URL, if any.
    fn get(&self, code: &ShortCode) -> Option<LongUrl>;

    /// Inserts the mapping only when `code` is not cached yet.
    ///
    /// Returns `true` if inserted, `false` if an entry was already present
    /// (the existing value is left untouched).
    fn set_if_absent(&self, code: &ShortCode, url: &LongUrl) -> bool;

    /// Stores a mapping fetched from the store.
    fn insert(&self, code: &ShortCode, url: &LongUrl);

    /// Removes the entry. It is not an error if the key does not exist.
    fn remove(&self, code: &ShortCode);

    /// Number of cached entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behavior every [`LocalCache`] implementation must share.

    use super::LocalCache;
    use linkhop_core::{LongUrl, ShortCode};
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn url(s: &str) -> LongUrl {
        LongUrl::new_unchecked(s)
    }

    pub fn set_if_absent_keeps_first_value(cache: impl LocalCache) {
        assert!(cache.set_if_absent(&code("abcd"), &url("http://a.com")));
        assert!(!cache.set_if_absent(&code("abcd"), &url("http://b.com")));
        assert_eq!(cache.get(&code("abcd")), Some(url("http://a.com")));
    }

    pub fn remove_is_idempotent(cache: impl LocalCache) {
        cache.insert(&code("abcd"), &url("http://a.com"));
        cache.remove(&code("abcd"));
        cache.remove(&code("abcd"));
        assert_eq!(cache.get(&code("abcd")), None);
        assert!(cache.set_if_absent(&code("abcd"), &url("http://b.com")));
    }

    pub async fn concurrent_set_if_absent_single_winner<C: LocalCache>(cache: C) {
        let cache = Arc::new(cache);
        let mut handles = vec![];

        for i in 0..32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.set_if_absent(&code("race"), &url(&format!("http://{i}.com")))
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert!(cache.get(&code("race")).is_some());
    }
}
