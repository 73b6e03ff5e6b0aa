//! Blog posts backend - server entry point

use std::net::SocketAddr;

use anyhow::Context;

use blog_posts_api::config::Config;
use blog_posts_api::db::{self, Database};
use blog_posts_api::{AppState, build_app, services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first so the log format is known before tracing starts
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    services::init_tracing(config.log_format);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting blog posts backend");
    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; using a random secret, tokens will not survive restarts");
    }

    let db = Database::connect_with_retry(
        &config.database_url,
        config.database_max_connections,
        config.database_connect_timeout,
    )
    .await?;
    db.migrate().await.context("Failed to run migrations")?;
    tracing::info!(url = %config.database_url, "Database connected");

    if config.seed_demo_data {
        let result = db::run_demo_seed(&db).await?;
        if result.skipped {
            tracing::info!("Database already has users, demo seed skipped");
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let host = config.host.clone();
    let state = AppState::new(config, db.clone());
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, host = ?host, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
