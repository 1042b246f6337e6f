//! Redis-backed store: one hash for the mappings, one pub/sub channel for
//! deletions.

mod settings;
mod subscription;

pub use settings::StoreSettings;
pub use subscription::RedisSubscription;

use async_trait::async_trait;
use deadpool_redis::redis::{self, AsyncCommands};
use deadpool_redis::{Connection, Pool, PoolConfig, Runtime};
use linkhop_core::store::Result;
use linkhop_core::{
    InvalidationMessage, InvalidationSource, LongUrl, MappingStore, ShortCode, StoreError,
    Subscription,
};
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

fn map_redis_error(operation: &str, err: redis::RedisError) -> StoreError {
    StoreError::Connection(format!("{operation}: {err}"))
}

fn map_pool_error(operation: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Connection(format!("{operation}: {err}"))
}

/// Aborts the idle reaper once the last store handle is dropped.
struct ReaperGuard(JoinHandle<()>);

impl Drop for ReaperGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A [`MappingStore`] and [`InvalidationSource`] backed by Redis.
///
/// Mappings are fields of a single hash (`HSETNX`/`HGET`/`HDEL`/`HSCAN`),
/// so atomic insert-if-absent comes straight from `HSETNX`. Commands go
/// through a bounded deadpool pool; subscriptions use their own dedicated
/// connection since a subscribed connection cannot run regular commands.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    pool: Pool,
    settings: StoreSettings,
    _reaper: Arc<ReaperGuard>,
}

impl RedisStore {
    /// Builds the pool and checks that the server answers a `PING`.
    ///
    /// Must be called from within a tokio runtime; it spawns the task that
    /// evicts idle pooled connections.
    pub async fn connect(url: &str, settings: StoreSettings) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| map_redis_error("invalid redis url", e))?;

        let mut pool_config = PoolConfig::new(settings.max_size);
        // Callers queue for a free connection rather than being rejected.
        pool_config.timeouts.wait = None;
        pool_config.timeouts.create = Some(settings.connect_timeout);
        pool_config.timeouts.recycle = Some(settings.op_timeout);

        let mut config = deadpool_redis::Config::from_url(url);
        config.pool = Some(pool_config);
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| map_pool_error("failed to create redis pool", e))?;

        let reaper = spawn_idle_reaper(
            pool.clone(),
            settings.min_idle,
            settings.idle_timeout,
        );

        let store = Self {
            client,
            pool,
            settings,
            _reaper: Arc::new(ReaperGuard(reaper)),
        };
        store.ping().await?;

        info!(
            hash_key = %store.settings.hash_key,
            channel = %store.settings.channel,
            max_size = store.settings.max_size,
            "connected to redis store"
        );
        Ok(store)
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        self.timed("ping", redis::cmd("PING").query_async::<String>(&mut conn))
            .await
            .map(|_| ())
    }

    async fn conn(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| map_pool_error("failed to get redis connection", e))
    }

    /// Applies the per-command read/write deadline.
    async fn timed<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.settings.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(map_redis_error(operation, e)),
            Err(_) => Err(StoreError::Connection(format!(
                "{operation}: timed out after {:?}",
                self.settings.op_timeout
            ))),
        }
    }

    async fn publish_delete(&self, conn: &mut Connection, code: &ShortCode) -> Result<()> {
        let message = InvalidationMessage::delete(code.clone()).encode();
        trace!(code = %code, channel = %self.settings.channel, "publishing delete message");

        let channel = self.settings.channel.as_str();
        let receivers: i64 = self
            .timed("publish", conn.publish(channel, message))
            .await
            .inspect_err(|e| warn!(code = %code, error = %e, "failed to publish delete message"))?;

        debug!(code = %code, receivers, "published delete message");
        Ok(())
    }
}

#[async_trait]
impl MappingStore for RedisStore {
    async fn get(&self, code: &ShortCode) -> Result<LongUrl> {
        let mut conn = self.conn().await?;
        let hash = self.settings.hash_key.as_str();

        let value: Option<String> = self.timed("hget", conn.hget(hash, code.as_str())).await?;
        match value {
            Some(url) => Ok(LongUrl::new_unchecked(url)),
            None => Err(StoreError::NotFound(code.to_string())),
        }
    }

    async fn set_if_absent(&self, code: &ShortCode, url: &LongUrl) -> Result<()> {
        let mut conn = self.conn().await?;
        let hash = self.settings.hash_key.as_str();

        let inserted: i64 = self
            .timed("hsetnx", conn.hset_nx(hash, code.as_str(), url.as_str()))
            .await?;
        if inserted == 0 {
            return Err(StoreError::AlreadyExists(code.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let mut conn = self.conn().await?;
        let hash = self.settings.hash_key.as_str();

        let removed: i64 = self.timed("hdel", conn.hdel(hash, code.as_str())).await?;
        if removed == 0 {
            trace!(code = %code, "delete of absent code, nothing to publish");
            return Ok(false);
        }

        self.publish_delete(&mut conn, code).await?;
        Ok(true)
    }

    async fn scan_all(
        &self,
        callback: &mut (dyn FnMut(ShortCode, LongUrl) -> ControlFlow<()> + Send),
    ) -> Result<usize> {
        let mut conn = self.conn().await?;
        let hash = self.settings.hash_key.as_str();
        let mut cursor: u64 = 0;
        let mut visited = 0;

        loop {
            let (next, fields): (u64, Vec<String>) = self
                .timed(
                    "hscan",
                    redis::cmd("HSCAN")
                        .arg(hash)
                        .arg(cursor)
                        .query_async(&mut conn),
                )
                .await?;

            for pair in fields.chunks_exact(2) {
                visited += 1;
                let code = ShortCode::new_unchecked(pair[0].clone());
                let url = LongUrl::new_unchecked(pair[1].clone());
                if callback(code, url).is_break() {
                    return Ok(visited);
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(visited)
    }
}

#[async_trait]
impl InvalidationSource for RedisStore {
    async fn connect(&self) -> Result<Box<dyn Subscription>> {
        let subscription = RedisSubscription::open(
            &self.client,
            &self.settings.channel,
            self.settings.connect_timeout,
            self.settings.op_timeout,
        )
        .await?;
        Ok(Box::new(subscription))
    }
}

fn spawn_idle_reaper(pool: Pool, min_idle: usize, idle_timeout: Duration) -> JoinHandle<()> {
    let period = (idle_timeout / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let removed = evict_idle(&pool, min_idle, idle_timeout);
            if removed > 0 {
                debug!(removed, "evicted idle redis connections");
            }
        }
    })
}

/// Drops pooled connections unused for longer than `idle_timeout`,
/// keeping at least `min_idle` of the available ones.
fn evict_idle(pool: &Pool, min_idle: usize, idle_timeout: Duration) -> usize {
    let surplus = pool.status().available.saturating_sub(min_idle);
    if surplus == 0 {
        return 0;
    }

    let budget = AtomicUsize::new(surplus);
    let result = pool.retain(|_, metrics| {
        if metrics.last_used() < idle_timeout {
            return true;
        }
        budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    });
    result.removed.len()
}
