use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trailhead::config::{Config, DEFAULT_LOG_FILTER};
use trailhead::db::Database;
use trailhead::{AppState, build_app, graphql};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting Trailhead");

    let config = Arc::new(Config::from_env()?);
    tracing::info!(database_url = %config.database_url, "Configuration loaded");

    let db = Database::connect_with_retry(
        &config.database_url,
        config.database_max_connections,
        Duration::from_secs(2),
        Duration::from_secs(30),
    )
    .await?;
    db.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Database connected and migrated");

    let schema = graphql::build_schema(db.clone());
    tracing::info!("GraphQL schema built");

    let state = AppState {
        config: config.clone(),
        db,
        schema,
    };
    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);
    match &config.host {
        Some(host) => tracing::info!("GraphiQL: http://{}:{}/graphql", host, config.port),
        None => tracing::info!("GraphiQL: http://localhost:{}/graphql", config.port),
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
