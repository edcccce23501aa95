use std::sync::Arc;
use std::time::Duration;

use reelmatch_api::{
    catalog::load_dataset,
    config::Config,
    db::{create_redis_client, CacheWriterHandle, MemoryCache, MetadataCache, RedisCache},
    routes::{create_router, AppState},
    services::{providers::TmdbProvider, MetadataGateway, RecommendationEngine},
};
use tracing_subscriber::EnvFilter;

const RETRY_BACKOFF: Duration = Duration::from_millis(100);
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reelmatch_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // A dataset that fails validation must stop startup
    let dataset = load_dataset(&config.catalog_path, &config.similarity_path)?;

    let provider = TmdbProvider::new(
        config.api_credential.clone(),
        config.metadata_api_url.clone(),
        config.metadata_language.clone(),
        config.artwork_base_url.clone(),
        config.metadata_timeout(),
    )?;

    let (cache, cache_writer): (Arc<dyn MetadataCache>, Option<CacheWriterHandle>) =
        match &config.redis_url {
            Some(redis_url) => {
                let client = create_redis_client(redis_url)?;
                let (cache, handle) = RedisCache::new(client, config.cache_ttl_seconds);
                (Arc::new(cache), Some(handle))
            }
            None => {
                let cache = MemoryCache::new(config.cache_ttl());
                cache.spawn_sweeper(CACHE_SWEEP_INTERVAL);
                (Arc::new(cache), None)
            }
        };

    tracing::info!(
        cache = cache.name(),
        ttl_seconds = config.cache_ttl_seconds,
        "Metadata cache ready"
    );

    let gateway = MetadataGateway::new(Arc::new(provider), cache, config.metadata_timeout())
        .with_retries(config.metadata_max_retries, RETRY_BACKOFF);

    let engine = RecommendationEngine::new(&dataset, gateway, config.engine_settings());
    let state = AppState::new(
        engine,
        config.popular_titles.clone(),
        config.min_count,
        config.max_count,
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
