mod ats;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod scoring;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::{ExtractionOptions, NormalizeMode};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scoring::{KeywordAtsScorer, LlmAtsScorer, ResumeScorer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Scorer: LLM when a key is configured, keyword heuristics otherwise
    let scorer: Arc<dyn ResumeScorer> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.llm_model.clone())?;
            info!("LLM scorer initialized (model: {})", llm.model());
            Arc::new(LlmAtsScorer(llm))
        }
        None => {
            info!("No ANTHROPIC_API_KEY set, using keyword scorer");
            Arc::new(KeywordAtsScorer)
        }
    };

    let mode = if config.strict_token_filter {
        NormalizeMode::Strict
    } else {
        NormalizeMode::Lenient
    };
    let options = ExtractionOptions::server().with_mode(mode);
    info!(
        ?mode,
        max_upload_bytes = config.max_upload_bytes,
        "Extraction configured"
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        scorer,
        options,
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
