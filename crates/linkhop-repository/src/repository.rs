use crate::error::{RepositoryError, Result};
use crate::listener::{InvalidationListener, ListenerHandle, ListenerSettings};
use linkhop_cache::LocalCache;
use linkhop_core::shortcode::MAX_LENGTH;
use linkhop_core::{InvalidationSource, LongUrl, MappingStore, ShortCode, StoreError};
use linkhop_generator::CodeGenerator;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

/// Shortest generated code the repository accepts to be configured with.
pub const MIN_CODE_LENGTH: usize = 4;

#[derive(Debug, Clone, TypedBuilder)]
pub struct RepositorySettings {
    /// Length of generated short codes.
    #[builder(default = 5)]
    pub code_length: usize,

    /// Candidates tried by `put` before giving up.
    #[builder(default = 20)]
    pub max_attempts: usize,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RepositorySettings {
    fn validate(&self) -> Result<()> {
        if self.code_length < MIN_CODE_LENGTH {
            return Err(RepositoryError::Config(format!(
                "code length must be at least {}, got {}",
                MIN_CODE_LENGTH, self.code_length
            )));
        }
        if self.code_length > MAX_LENGTH {
            return Err(RepositoryError::Config(format!(
                "code length must be at most {}, got {}",
                MAX_LENGTH, self.code_length
            )));
        }
        if self.max_attempts == 0 {
            return Err(RepositoryError::Config(
                "max attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a single candidate insert.
enum InsertError {
    /// The candidate is taken, locally or in the store.
    Collision,
    Store(StoreError),
}

/// Maps short codes to long URLs through a local cache and an optional
/// shared store.
///
/// Without a store the repository is a single-instance, in-memory map.
/// With one, the store is authoritative: `put` relies on its atomic
/// insert-if-absent, `get` reads through it, and `delete` goes through it
/// so the deletion is broadcast to the other instances.
pub struct Repository<C, G> {
    cache: C,
    store: Option<Arc<dyn MappingStore>>,
    generator: G,
    settings: RepositorySettings,
    /// Bumped before every eviction. A store read only fills the cache if
    /// no eviction happened while it was in flight.
    evictions: AtomicU64,
}

impl<C: LocalCache, G: CodeGenerator> Repository<C, G> {
    /// Creates a repository. Pass `None` as `store` to disable persistence.
    pub fn new(
        cache: C,
        generator: G,
        store: Option<Arc<dyn MappingStore>>,
        settings: RepositorySettings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            cache,
            store,
            generator,
            settings,
            evictions: AtomicU64::new(0),
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    pub fn settings(&self) -> &RepositorySettings {
        &self.settings
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolves a code to its long URL.
    ///
    /// A store outage is reported as [`RepositoryError::NotFound`]; the
    /// underlying error is only logged.
    pub async fn get(&self, code: &ShortCode) -> Result<LongUrl> {
        if let Some(url) = self.cache.get(code) {
            trace!(code = %code, "local cache hit");
            return Ok(url);
        }

        let Some(store) = &self.store else {
            return Err(RepositoryError::NotFound(code.to_string()));
        };

        let epoch = self.evictions.load(Ordering::SeqCst);
        match store.get(code).await {
            Ok(url) => {
                self.fill(code, &url, epoch);
                Ok(url)
            }
            Err(StoreError::NotFound(_)) => Err(RepositoryError::NotFound(code.to_string())),
            Err(e) => {
                warn!(code = %code, error = %e, "store lookup failed, reporting not found");
                Err(RepositoryError::NotFound(code.to_string()))
            }
        }
    }

    /// Stores `raw` under a freshly generated code and returns the code.
    ///
    /// `raw` is normalized first (trimmed, `http://` added when missing).
    /// The mapping is visible to `get` on this instance as soon as this
    /// returns.
    pub async fn put(&self, raw: &str) -> Result<ShortCode> {
        let url = LongUrl::normalize(raw)?;

        for attempt in 1..=self.settings.max_attempts {
            let code = self.generator.generate(self.settings.code_length);

            match self.try_insert(&code, &url).await {
                Ok(()) => {
                    debug!(code = %code, attempt, "stored new mapping");
                    return Ok(code);
                }
                Err(InsertError::Collision) => {
                    trace!(code = %code, attempt, "short code collision, retrying");
                }
                Err(InsertError::Store(e)) => {
                    warn!(code = %code, error = %e, "failed to persist new mapping");
                    return Err(RepositoryError::Connection(e.to_string()));
                }
            }
        }

        warn!(
            attempts = self.settings.max_attempts,
            code_length = self.settings.code_length,
            "short code space exhausted, consider a longer code length"
        );
        Err(RepositoryError::GenerationExhausted {
            attempts: self.settings.max_attempts,
        })
    }

    /// Claims `code` locally, then in the store. A store failure of any
    /// kind releases the local claim before returning, so the cache never
    /// keeps an entry the store refused.
    async fn try_insert(&self, code: &ShortCode, url: &LongUrl) -> std::result::Result<(), InsertError> {
        if !self.cache.set_if_absent(code, url) {
            return Err(InsertError::Collision);
        }

        let Some(store) = &self.store else {
            return Ok(());
        };

        match store.set_if_absent(code, url).await {
            Ok(()) => Ok(()),
            Err(StoreError::AlreadyExists(_)) => {
                self.cache.remove(code);
                Err(InsertError::Collision)
            }
            Err(e) => {
                self.cache.remove(code);
                Err(InsertError::Store(e))
            }
        }
    }

    /// Caches a value read from the store, unless an eviction raced the
    /// read. The entry is inserted before the second check so an eviction
    /// landing in between still removes it.
    fn fill(&self, code: &ShortCode, url: &LongUrl, epoch: u64) {
        if self.evictions.load(Ordering::SeqCst) != epoch {
            trace!(code = %code, "eviction raced store read, not caching");
            return;
        }
        self.cache.insert(code, url);
        if self.evictions.load(Ordering::SeqCst) != epoch {
            self.cache.remove(code);
            trace!(code = %code, "eviction raced store read, not caching");
            return;
        }
        trace!(code = %code, "loaded from store into local cache");
    }

    fn evict(&self, code: &ShortCode) {
        self.evictions.fetch_add(1, Ordering::SeqCst);
        self.cache.remove(code);
    }

    /// Removes a mapping here and in the store. Deleting an unknown code
    /// succeeds.
    pub async fn delete(&self, code: &ShortCode) -> Result<()> {
        self.evict(code);

        if let Some(store) = &self.store {
            let removed = store.delete(code).await.map_err(|e| {
                warn!(code = %code, error = %e, "failed to delete mapping from store");
                RepositoryError::Connection(e.to_string())
            })?;
            debug!(code = %code, removed, "deleted mapping");
        }

        Ok(())
    }

    /// Evicts `code` from the local cache in response to a deletion made
    /// elsewhere. The store is not touched.
    pub fn handle_invalidation(&self, code: &ShortCode) {
        self.evict(code);
        debug!(code = %code, "evicted invalidated code from local cache");
    }

    /// Loads every stored mapping into the local cache.
    ///
    /// Returns the number of mappings visited; `0` without a store. The
    /// scan stops early if an eviction arrives while it runs, leaving the
    /// rest to be loaded on demand.
    pub async fn warm_up(&self) -> Result<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };

        let epoch = self.evictions.load(Ordering::SeqCst);
        let loaded = store
            .scan_all(&mut |code, url| {
                self.fill(&code, &url, epoch);
                if self.evictions.load(Ordering::SeqCst) != epoch {
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            })
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        info!(loaded, "warmed local cache from store");
        Ok(loaded)
    }
}

impl<C: LocalCache, G: CodeGenerator> Repository<C, G> {
    /// Starts the invalidation listener for this repository.
    pub fn spawn_listener(
        self: &Arc<Self>,
        source: Arc<dyn InvalidationSource>,
        settings: ListenerSettings,
    ) -> ListenerHandle {
        let repository = Arc::clone(self);
        InvalidationListener::new(
            source,
            move |code| repository.handle_invalidation(&code),
            settings,
        )
        .spawn()
    }
}
