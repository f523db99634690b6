//! proofstream-gateway server entry point.
//!
//! Starts the Axum HTTP server with the REST endpoints and, when enabled,
//! a background task purging expired events.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use proofstream_gateway::api;
use proofstream_gateway::app_state::AppState;
use proofstream_gateway::config::{GatewayConfig, LogFormat};
use proofstream_gateway::normalizer::EventNormalizer;
use proofstream_gateway::persistence::{EventStore, InMemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting proofstream-gateway");

    // Build persistence layer
    let store: Arc<dyn EventStore> = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        let store = PostgresStore::new(pool);
        store.migrate().await?;
        Arc::new(store)
    } else {
        tracing::warn!("persistence disabled, events are kept in memory only");
        Arc::new(InMemoryStore::new())
    };
    tracing::info!(backend = store.backend(), "event store ready");

    // Schedule expired-event purges
    if config.purge_interval_secs > 0 {
        let store = Arc::clone(&store);
        let period = Duration::from_secs(config.purge_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match store.purge_expired(Utc::now()).await {
                    Ok(removed) => tracing::info!(removed, "expired events purged"),
                    Err(e) => tracing::warn!(error = %e, "purge cycle failed"),
                }
            }
        });
    }

    // Build application state
    let app_state = AppState::new(store, EventNormalizer::new(), config.queue);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
