//! Web server for the earthquake map.
//!
//! Every page load re-runs the pipeline, so the map always reflects the
//! feed at request time. The blocking fetch runs on tokio's blocking pool.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};

use crate::config::{FetchFailurePolicy, PipelineConfig};
use crate::errors::PipelineError;
use crate::html;
use crate::map::MapView;
use crate::marker::Marker;
use crate::pipeline;
use crate::render::render_document;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub pipeline: PipelineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<PipelineConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(pipeline: PipelineConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(map_handler))
        .route("/markers", get(markers_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let app = create_router(AppState::new(config.pipeline));

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("🌍 quakemap serving at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the pipeline off the async executor.
async fn load_map(config: Arc<PipelineConfig>) -> Result<MapView, Response> {
    let policy = config.on_fetch_error;
    let joined = tokio::task::spawn_blocking(move || pipeline::run(&config)).await;

    match joined {
        Ok(Ok(map)) => Ok(map),
        Ok(Err(e)) => Err(failure_response(e, policy)),
        Err(e) => {
            tracing::error!("pipeline task failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

/// Shape the response for a failed pipeline run.
///
/// Fetch failures follow `policy`; build failures are always reported.
fn failure_response(err: PipelineError, policy: FetchFailurePolicy) -> Response {
    let (status, policy) = match err {
        PipelineError::Fetch(_) => (StatusCode::BAD_GATEWAY, policy),
        PipelineError::Build(_) => (StatusCode::UNPROCESSABLE_ENTITY, FetchFailurePolicy::Report),
    };
    let chain = format!("{:#}", anyhow::Error::from(err));

    match policy {
        FetchFailurePolicy::Silent => {
            tracing::debug!("{}", chain);
            status.into_response()
        }
        FetchFailurePolicy::Report => {
            tracing::warn!("{}", chain);
            let page = format!(
                "<!DOCTYPE html>\n<html><body><h3>Earthquake map unavailable</h3><p>{}</p></body></html>\n",
                html::escape(&chain)
            );
            (status, Html(page)).into_response()
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Map page handler - fetches the feed and renders a fresh page.
async fn map_handler(State(state): State<AppState>) -> Response {
    let map = match load_map(state.pipeline.clone()).await {
        Ok(map) => map,
        Err(response) => return response,
    };

    match render_document(&map) {
        Ok(doc) => Html(doc).into_response(),
        Err(e) => {
            tracing::error!("failed to render map: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Marker handler - the current markers as JSON.
async fn markers_handler(State(state): State<AppState>) -> Response {
    match load_map(state.pipeline.clone()).await {
        Ok(map) => {
            let markers: Vec<Marker> = map
                .overlays
                .into_iter()
                .flat_map(|o| o.layer.markers)
                .collect();
            Json(markers).into_response()
        }
        Err(response) => response,
    }
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}
