//! HTTP API for the Docent service.
//!
//! - `POST /upload` runs an image or PDF through the model
//! - `GET /health` reports uptime and model reachability

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::DocentService;

pub mod upload;
use upload::upload_handler;

/// Application state
pub struct AppState {
    pub service: Arc<DocentService>,
    pub start_time: Instant,
}

/// Build the API router
pub fn router(service: Arc<DocentService>) -> Router {
    let state = Arc::new(AppState {
        service,
        start_time: Instant::now(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/upload",
            post(upload_handler).layer(DefaultBodyLimit::disable()),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Health ===

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model_available = state.service.gemini.model_available().await;

    Json(HealthResponse {
        status: if model_available { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: state.service.gemini.model().to_string(),
        model_available,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    model: String,
    model_available: bool,
}
