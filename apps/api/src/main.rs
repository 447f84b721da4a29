mod analysis;
mod config;
mod embeddings;
mod errors;
mod ingestion;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod profile;
mod progress;
mod routes;
mod state;

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
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobscout v{}", env!("CARGO_PKG_VERSION"));
    log_credential_status(&config);

    let state = AppState::new(config.clone())?;
    info!(
        "Embedding cache: capacity {}, ttl {}s",
        config.embedding_cache_capacity,
        config.embedding_cache_ttl.as_secs()
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Reports which optional integrations are configured at the process level.
/// Requests may still supply their own keys.
fn log_credential_status(config: &Config) {
    let status = |key: &Option<String>| if key.is_some() { "set" } else { "not set" };
    info!(
        serp = status(&config.serp_api_key),
        jsearch = status(&config.jsearch_key),
        openai = status(&config.openai_api_key),
        openrouter = status(&config.openrouter_api_key),
        "environment credentials"
    );
}
