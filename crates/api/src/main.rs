use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use campus_admin_api::{app, config, middleware};
use persistence::store::{MemoryDocumentStore, PgDocumentStore};
use persistence::DocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {e}"))?;

    info!("Starting Campus Admin API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn DocumentStore> = match config.storage.backend {
        config::StorageBackend::Postgres => {
            let pool = persistence::db::create_pool(&(&config.database).into()).await?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;

            let store = PgDocumentStore::new(pool);
            spawn_pool_metrics(store.pool().clone());
            Arc::new(store)
        }
        config::StorageBackend::Memory => {
            info!("Using in-memory document store; data will not survive restarts");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    // Build application
    let addr = config.socket_addr()?;
    let app = app::create_app(config, store);

    // Start server
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Publish connection pool gauges every 10 seconds.
fn spawn_pool_metrics(pool: PgPool) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(10));
        loop {
            ticker.tick().await;
            persistence::metrics::record_pool_metrics(&pool);
        }
    });
}
