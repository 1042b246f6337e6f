use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "LINKHOP_LISTEN_ADDR";
pub const PUBLIC_HOST_ENV: &str = "LINKHOP_PUBLIC_HOST";
pub const SCHEME_ENV: &str = "LINKHOP_SCHEME";
pub const CODE_LENGTH_ENV: &str = "LINKHOP_CODE_LENGTH";
pub const REDIS_URL_ENV: &str = "LINKHOP_REDIS_URL";
pub const POOL_MAX_SIZE_ENV: &str = "LINKHOP_POOL_MAX_SIZE";
pub const POOL_MIN_IDLE_ENV: &str = "LINKHOP_POOL_MIN_IDLE";
pub const WARM_CACHE_ENV: &str = "LINKHOP_WARM_CACHE";
pub const CACHE_CAPACITY_ENV: &str = "LINKHOP_CACHE_CAPACITY";
pub const LOG_FORMAT_ENV: &str = "LINKHOP_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_PUBLIC_HOST: &str = "127.0.0.1:8080";
pub const DEFAULT_SCHEME: &str = "http";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "linkhop", about = "Short link service")]
pub struct Cli {
    #[arg(short = 'l', long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Host rendered into created short links.
    #[arg(long, env = PUBLIC_HOST_ENV, default_value = DEFAULT_PUBLIC_HOST)]
    pub public_host: String,

    /// Scheme rendered into created short links.
    #[arg(long, env = SCHEME_ENV, default_value = DEFAULT_SCHEME)]
    pub scheme: String,

    #[arg(long, env = CODE_LENGTH_ENV, default_value_t = 5)]
    pub code_length: usize,

    /// e.g. `redis://127.0.0.1:6379/1`. Leave unset or empty to keep
    /// everything in memory on this instance only.
    #[arg(long, env = REDIS_URL_ENV)]
    pub redis_url: Option<String>,

    #[arg(long, env = POOL_MAX_SIZE_ENV, default_value_t = 128)]
    pub pool_max_size: usize,

    #[arg(long, env = POOL_MIN_IDLE_ENV, default_value_t = 3)]
    pub pool_min_idle: usize,

    /// Bound the local cache to this many entries. Only valid together
    /// with a Redis URL.
    #[arg(long, env = CACHE_CAPACITY_ENV)]
    pub cache_capacity: Option<u64>,

    /// Load every stored mapping into the local cache at startup.
    #[arg(long, env = WARM_CACHE_ENV)]
    pub warm_cache: bool,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,
}

impl Cli {
    /// The Redis URL, if persistence is enabled.
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Rejects option combinations clap cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache_capacity.is_some() && self.redis_url().is_none() {
            anyhow::bail!("--cache-capacity requires --redis-url, the in-memory mode cannot evict links");
        }
        Ok(())
    }
}
