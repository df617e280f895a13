use std::sync::Arc;

use tracing::{info, warn};

use inventory_management::config::Config;
use inventory_management::db::{self, PgCategoryStore};
use inventory_management::store::{CategoryStore, MemoryCategoryStore};
use inventory_management::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,inventory_management=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!(
        title = config.api.title,
        version = config.api.version,
        "Starting service"
    );

    let categories: Arc<dyn CategoryStore> = match config.database_url.as_deref() {
        Some(url) => Arc::new(PgCategoryStore::new(db::connect(&config, url).await?)),
        None => {
            warn!("DATABASE_URL not set, categories are kept in memory only");
            Arc::new(MemoryCategoryStore::new())
        }
    };

    let addr = config.bind_addr();
    let app = build_router(AppState::new(config, categories));

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
