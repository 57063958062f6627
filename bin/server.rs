// Customer Rewards - Web Server

use anyhow::{Context, Result};
use chrono::Local;
use customer_rewards::api::{router, AppState};
use customer_rewards::{init_logging, seed_sample_data, Config, RewardsService, SqliteStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::from_env()?;
    info!("Starting rewards server v{}", customer_rewards::VERSION);

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database at {:?}", config.db_path))?;

    if config.seed_on_startup {
        let report = seed_sample_data(&store, Local::now().date_naive())?;
        info!(
            "Sample data: {} customers, {} new transactions",
            report.customers, report.transactions
        );
    }

    let service = RewardsService::new(Arc::new(store));
    let app = router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Server running on http://{}", config.bind_addr);
    info!("   API: http://{}/api/rewards", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
