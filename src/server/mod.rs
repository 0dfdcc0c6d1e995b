//! HTTP surface
//!
//! - `GET /`                  liveness banner
//! - `GET /health`            status plus yt-dlp version when available
//! - `POST /get-download-url` `{url}` -> direct media URL from the fallback chain

pub mod handlers;
pub mod models;

use crate::extractor::HybridExtractor;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

/// Shared, read-only state; requests never mutate it
pub struct AppState {
    pub chain: HybridExtractor,
    pub ytdlp_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(chain: HybridExtractor, ytdlp_path: Option<PathBuf>) -> Self {
        Self { chain, ytdlp_path }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/get-download-url", post(handlers::get_download_url))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
