//! Web Server Module
//!
//! Serves the browser playground and the two JSON/multipart API routes that
//! front the speech adapters. The page keeps the user's API key in browser
//! memory only and sends it as a bearer header on every request; the server
//! never stores it.

mod routes;
mod sink;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::speech::SpeechClient;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub speech: SpeechClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let speech = SpeechClient::from_config(&config.api)
            .context("Failed to build speech client")?;
        Ok(Self {
            config: Arc::new(config),
            speech,
        })
    }
}

/// Build the application router.
///
/// The body limit is raised above the 25MB upload cap so oversized uploads
/// reach our validator and get the descriptive rejection instead of a bare
/// transport error.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/assets/app.js", get(routes::app_js))
        .route("/assets/style.css", get(routes::style_css))
        .route("/api/transcribe", post(routes::transcribe))
        .route("/api/speak", post(routes::speak))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the web playground until the process is stopped.
pub async fn serve(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let state = AppState::new(config)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("🦀 CrabVoice listening on http://{addr}");
    if !state.config.has_api_key() {
        tracing::info!("No OPENAI_API_KEY configured; the page will ask for one");
    }

    axum::serve(listener, router(state))
        .await
        .context("Server error")
}
