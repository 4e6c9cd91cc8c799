//! HTTP Server
//!
//! Thin axum surface over the tag-generation and prompt-analysis
//! pipelines. The server is stateless per request; the only shared
//! mutable resource is the response cache.

mod analyze;
mod generate;

pub use analyze::analyze_prompt;
pub use generate::generate_tags;

use axum::{Json, Router, extract::State, routing::get, routing::post};
use serde::Serialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::ai::provider::{SharedProvider, create_provider};
use crate::cache::ResponseCache;
use crate::config::Config;
use crate::types::{LoomError, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// None when no credential is configured; generation then serves
    /// fallback content instead of failing
    pub provider: Option<SharedProvider>,
    pub cache: Arc<ResponseCache>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// A missing credential is an expected operating mode: it disables
    /// AI-backed generation and is logged, never fatal.
    pub fn from_config(config: Config) -> Self {
        let provider = match create_provider(&config.llm) {
            Ok(provider) => Some(provider),
            Err(e) => {
                warn!("AI generation disabled: {}", e);
                None
            }
        };

        Self {
            provider,
            cache: Arc::new(ResponseCache::new(std::time::Duration::from_secs(
                config.cache.ttl_secs,
            ))),
            config: Arc::new(config),
        }
    }
}

/// Error body for non-2xx responses
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/tags/generate", post(generate::generate_tags))
        .route("/api/gemini/analyze", post(analyze::analyze_prompt))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the server until ctrl-c
pub async fn serve(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| LoomError::Config(format!("Invalid server address: {}", e)))?;

    let state = AppState::from_config(config);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LoomError::Server(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to install ctrl-c handler: {}", e);
    }
    info!("Shutdown signal received");
}

/// Report process and provider health
async fn health(State(state): State<AppState>) -> Json<Value> {
    let provider_reachable = match &state.provider {
        Some(provider) => provider.health_check().await.unwrap_or(false),
        None => false,
    };

    Json(json!({
        "status": "ok",
        "provider": state.provider.as_ref().map(|p| p.name().to_string()),
        "provider_reachable": provider_reachable,
        "cache_entries": state.cache.len(),
    }))
}
