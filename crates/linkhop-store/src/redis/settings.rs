use std::time::Duration;
use typed_builder::TypedBuilder;

/// Connection and layout settings for [`RedisStore`](super::RedisStore).
///
/// # Example
///
/// ```rust
/// use linkhop_store::StoreSettings;
/// use std::time::Duration;
///
/// let settings = StoreSettings::builder()
///     .max_size(32)
///     .op_timeout(Duration::from_millis(500))
///     .build();
/// assert_eq!(settings.min_idle, 3);
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct StoreSettings {
    /// Most connections the pool will hold open at once.
    #[builder(default = 128)]
    pub max_size: usize,

    /// Idle connections the reaper leaves alone.
    #[builder(default = 3)]
    pub min_idle: usize,

    /// How long a pooled connection may sit unused before it is closed.
    #[builder(default = Duration::from_secs(240))]
    pub idle_timeout: Duration,

    #[builder(default = Duration::from_secs(1))]
    pub connect_timeout: Duration,

    /// Deadline for a single command round trip.
    #[builder(default = Duration::from_secs(1))]
    pub op_timeout: Duration,

    /// The hash holding every code -> url pair.
    #[builder(default = "url_map".to_string())]
    pub hash_key: String,

    /// The pub/sub channel carrying `delete@<code>` messages.
    #[builder(default = "short_url:del".to_string())]
    pub channel: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
