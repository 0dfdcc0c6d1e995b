//! Data structures for resolution requests and results

use crate::utils::error::TubelinkError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static VIDEO_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://)?(?:(?:www|m|music)\.)?(?:youtube\.com/(?:watch\?(?:.*&)?v=|shorts/|embed/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    )
    .expect("Failed to compile YouTube regex")
});

static BARE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("Failed to compile id regex"));

/// An 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VideoId(String);

impl VideoId {
    /// Extract the id from a watch/shorts/embed/live/shortlink URL or a bare id
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if BARE_ID_REGEX.is_match(input) {
            return Some(Self(input.to_string()));
        }
        VIDEO_URL_REGEX
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL, free of playlist and tracking parameters
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated request handed to every strategy
#[derive(Debug, Clone)]
pub struct VideoTarget {
    /// The URL exactly as submitted
    pub source: String,
    pub video_id: VideoId,
}

impl VideoTarget {
    pub fn parse(url: &str) -> Result<Self, TubelinkError> {
        let source = url.trim();
        if source.is_empty() {
            return Err(TubelinkError::MissingUrl);
        }
        let video_id =
            VideoId::parse(source).ok_or_else(|| TubelinkError::InvalidUrl(source.to_string()))?;
        Ok(Self {
            source: source.to_string(),
            video_id,
        })
    }

    pub fn watch_url(&self) -> String {
        self.video_id.watch_url()
    }
}

/// A resolved direct download link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadInfo {
    /// Direct, time-limited media URL
    pub url: String,
    /// Quality label, e.g. "720p"
    pub quality: String,
    pub title: Option<String>,
    /// Id of the strategy that produced this link
    pub strategy: String,
}

impl DownloadInfo {
    pub fn new(strategy: &str, url: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality: quality.into(),
            title: None,
            strategy: strategy.to_string(),
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.trim().is_empty());
        self
    }
}

/// Builds a quality label from whatever a source reports
pub fn quality_label(label: Option<&str>, height: Option<u32>) -> String {
    if let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) {
        return label.to_string();
    }
    match height {
        Some(h) if h > 0 => format!("{}p", h),
        _ => "best".to_string(),
    }
}
