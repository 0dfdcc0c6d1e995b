//! Error handling for tubelink

use thiserror::Error;

/// Main error type for tubelink
#[derive(Debug, Error)]
pub enum TubelinkError {
    #[error("No URL provided")]
    MissingUrl,

    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to extract video info: {0}")]
    ExtractionError(String),

    #[error("No downloadable stream found: {0}")]
    NoStream(String),

    #[error("Timed out resolving download URL ({strategy} after {secs}s)")]
    Timeout { strategy: String, secs: u64 },

    #[error("Could not get download URL: all {attempted} methods failed")]
    Exhausted { attempted: usize },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TubelinkError {
    /// Errors caused by the request itself rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TubelinkError::MissingUrl
                | TubelinkError::InvalidUrl(_)
                | TubelinkError::Exhausted { .. }
        )
    }
}
