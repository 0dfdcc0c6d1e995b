use crate::extractor::{ytdlp, VideoTarget};
use crate::server::models::*;
use crate::server::AppState;
use crate::utils::error::TubelinkError;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json, Response},
};
use std::any::Any;
use std::sync::Arc;
use tracing::{error, info};

/// GET /
pub async fn home() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".into(),
        message: "YouTube Downloader API running".into(),
    })
}

/// GET /health
///
/// Always 200; a missing yt-dlp only drops the version field.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let yt_dlp_version = match state.ytdlp_path.as_deref() {
        Some(path) => ytdlp::ytdlp_version(path).await,
        None => None,
    };

    Json(HealthResponse {
        status: "ok".into(),
        message: "API running".into(),
        yt_dlp_version,
        strategies: state.chain.strategy_names(),
    })
}

/// POST /get-download-url
pub async fn get_download_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>, ApiError> {
    // A missing or unreadable body is reported the same as a missing url
    let url = payload
        .ok()
        .and_then(|Json(req)| req.url)
        .ok_or(TubelinkError::MissingUrl)?;

    info!("Processing: {}", url);
    let target = VideoTarget::parse(&url)?;

    let info = state.chain.resolve(&target).await.inspect_err(|e| {
        error!("Could not resolve {}: {}", target.video_id, e);
    })?;

    Ok(Json(DownloadResponse::new(info, target.source)))
}

/// Renders a handler panic as the regular 500 error body
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Unexpected error: {}", detail);
    ApiError::internal(format!("Unexpected error: {}", detail)).into_response()
}
