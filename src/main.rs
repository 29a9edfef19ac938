use clap::Parser;
use company_store::company::{Bootstrapper, CompanyState, router};
use company_store::config::{Settings, StoreBackend};
use company_store::store::{MemoryStore, RedisStore, StoreClient};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::parse();
    settings.validate()?;
    let bounds = settings.dataset_bounds()?;

    // 1. Store client:
    let store: Arc<dyn StoreClient> = match settings.store {
        StoreBackend::Memory => {
            tracing::info!("Using in-process store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Redis => {
            tracing::info!("Connecting to Redis at {}", settings.redis_url);
            Arc::new(RedisStore::connect(&settings.redis_url).await?)
        }
    };

    // 2. Bootstrap and repositories:
    let bootstrap = Bootstrapper::new(store.clone(), bounds)?
        .with_fan_out(settings.fan_out)
        .with_timeout(settings.bridge_timeout());
    let state = Arc::new(CompanyState::new(store, bootstrap, settings.fan_out));

    // 3. HTTP router:
    let app = router(state);

    // 4. Start HTTP server:
    tracing::info!("HTTP server listening on {}", settings.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
