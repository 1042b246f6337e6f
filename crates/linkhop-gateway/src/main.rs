use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use linkhop_cache::ConfiguredCache;
use linkhop_core::{InvalidationSource, MappingStore};
use linkhop_gateway::cli::Cli;
use linkhop_gateway::{logging, App, AppState};
use linkhop_generator::RandomGenerator;
use linkhop_repository::{ListenerSettings, Repository, RepositorySettings};
use linkhop_store::{RedisStore, StoreSettings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.validate()?;
    logging::init(cli.log_format);

    info!(
        listen_addr = %cli.listen_addr,
        public_host = %cli.public_host,
        code_length = cli.code_length,
        persistent = cli.redis_url().is_some(),
        cache_capacity = ?cli.cache_capacity,
        "starting linkhop"
    );

    let redis = match cli.redis_url() {
        Some(url) => {
            let settings = StoreSettings::builder()
                .max_size(cli.pool_max_size)
                .min_idle(cli.pool_min_idle)
                .build();
            let store = RedisStore::connect(url, settings)
                .await
                .context("failed to connect to redis")?;
            Some(Arc::new(store))
        }
        None => None,
    };

    let settings = RepositorySettings::builder()
        .code_length(cli.code_length)
        .build();
    let store = redis
        .clone()
        .map(|store| store as Arc<dyn MappingStore>);
    let repository = Arc::new(Repository::new(
        ConfiguredCache::new(cli.cache_capacity),
        RandomGenerator::new(),
        store,
        settings,
    )?);

    if cli.warm_cache {
        repository
            .warm_up()
            .await
            .context("failed to warm up local cache")?;
    }

    let listener = redis.map(|store| {
        repository.spawn_listener(
            store as Arc<dyn InvalidationSource>,
            ListenerSettings::default(),
        )
    });

    let app = App::router(AppState::new(
        Arc::clone(&repository),
        cli.scheme,
        cli.public_host,
    ));

    let tcp = tokio::net::TcpListener::bind(cli.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_addr))?;
    info!(listen_addr = %tcp.local_addr()?, "serving http");

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(listener) = listener {
        listener.shutdown().await;
    }
    info!("linkhop stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
