mod config;
mod errors;
mod models;
mod pipeline;
mod resources;
mod routes;
mod state;
#[cfg(test)]
mod testing;
mod validation;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talentboard API v{}", env!("CARGO_PKG_VERSION"));

    // Stores and boards, all backed by the CRM REST API
    let state = AppState::from_config(&config)?;
    info!("CRM backend: {}", config.crm_api_url);
    for (board, registry) in [("deals", &state.registries.deals), ("jobs", &state.registries.jobs)] {
        let stages: Vec<&str> = registry.iter().map(|s| s.id.as_str()).collect();
        info!("Board {board} stages: {}", stages.join(", "));
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the SPA host once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
