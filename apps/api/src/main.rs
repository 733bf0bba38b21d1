mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::CompletionClient;
use crate::resume::extract::DocxTextSource;
use crate::resume::pipeline::ResumePipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize resume storage; an unopenable database aborts startup
    let db = create_pool(&config.database_url).await?;

    // Initialize completion client
    let client =
        CompletionClient::from_config(&config.llm).context("Failed to build HTTP client")?;
    info!(
        "Completion client initialized (provider: {}, model: {})",
        client.provider().name(),
        client.model()
    );
    if config.llm.api_key.is_none() {
        warn!(
            "{} is not set; resume parsing will fail until it is configured",
            client.provider().credential_var()
        );
    }

    // Build app state
    let state = AppState {
        db,
        pipeline: ResumePipeline::new(Arc::new(DocxTextSource), client),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
