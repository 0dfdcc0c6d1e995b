use crate::extractor::DownloadInfo;
use crate::utils::error::TubelinkError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

/// POST /get-download-url body
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yt_dlp_version: Option<String>,
    pub strategies: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub url: String,
    pub quality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub source: String,
    pub strategy: String,
}

impl DownloadResponse {
    pub fn new(info: DownloadInfo, source: String) -> Self {
        Self {
            success: true,
            url: info.url,
            quality: info.quality,
            title: info.title,
            source,
            strategy: info.strategy,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// An error rendered as `{success: false, error}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<TubelinkError> for ApiError {
    fn from(err: TubelinkError) -> Self {
        let status = match &err {
            TubelinkError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            TubelinkError::ExtractionError(_) | TubelinkError::NoStream(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}
