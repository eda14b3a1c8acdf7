//! Airhop Server - airport lookups and hop-limited route finding

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use airhop_server::config::Config;
use airhop_server::persistence::{self, airports::count_airports, SqliteAirportStore};
use airhop_server::state::AppState;
use airhop_server::{api, loops};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    let filter = EnvFilter::from_default_env().add_directive("airhop_server=debug".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Airhop Server...");

    let db = persistence::init_database(&config.database_path, config.database_max_connections)
        .await?;
    let airport_count = count_airports(db.pool()).await?;
    if airport_count == 0 {
        tracing::warn!(
            "Airport catalog at {} is empty; run ingest_airports first",
            config.database_path
        );
    } else {
        tracing::info!("Serving {} airports", airport_count);
    }
    tracing::info!(
        "Max leg {:.1} km, up to {} neighbors per airport, search bound {} airports",
        config.max_leg_km,
        config.max_neighbors,
        config.max_visited
    );

    let port = config.server_port;
    let store = Arc::new(SqliteAirportStore::new(db.pool().clone()));
    let state = Arc::new(AppState::new(&config, store));

    // Start background loops
    tokio::spawn(loops::cache_prune_loop::run_cache_prune_loop(
        state.clone(),
        Duration::from_secs(config.cache_prune_interval_s),
    ));
    if config.warm_neighbor_cache {
        let warm_state = state.clone();
        let batch_size = config.warm_batch_size;
        tokio::spawn(async move {
            if let Err(err) = loops::warm_cache::warm_neighbor_cache(warm_state, batch_size).await {
                tracing::error!("Neighbor cache warm-up failed: {:#}", err);
            }
        });
    }

    let app = api::routes()
        .with_state(state)
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Airhop Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
