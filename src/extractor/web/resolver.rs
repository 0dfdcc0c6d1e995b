//! Cobalt-compatible video resolution API

use crate::extractor::models::{DownloadInfo, VideoTarget};
use crate::extractor::traits::Extractor;
use crate::utils::config::ResolverApiSettings;
use crate::utils::error::TubelinkError;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveRequest<'a> {
    url: &'a str,
    video_quality: &'a str,
    download_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    status: String,
    url: Option<String>,
    filename: Option<String>,
    error: Option<ApiFailure>,
}

#[derive(Debug, Deserialize)]
struct ApiFailure {
    code: String,
}

pub struct ResolverApiExtractor {
    client: reqwest::Client,
    settings: ResolverApiSettings,
}

impl ResolverApiExtractor {
    pub fn new(client: reqwest::Client, settings: ResolverApiSettings) -> Self {
        Self { client, settings }
    }
}

/// "My Video (720p, h264).mp4" -> "My Video (720p, h264)"
fn title_from_filename(filename: &str) -> Option<String> {
    let stem = filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _ext)| stem)
        .trim();
    (!stem.is_empty()).then(|| stem.to_string())
}

#[async_trait]
impl Extractor for ResolverApiExtractor {
    fn id(&self) -> &str {
        "resolver-api"
    }

    async fn resolve(&self, target: &VideoTarget) -> Result<DownloadInfo> {
        let watch_url = target.watch_url();
        let body = ResolveRequest {
            url: &watch_url,
            video_quality: &self.settings.quality,
            download_mode: "auto",
        };

        let mut request = self
            .client
            .post(&self.settings.endpoint)
            .header(ACCEPT, "application/json")
            .json(&body);
        if let Some(key) = self.settings.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.header(AUTHORIZATION, format!("Api-Key {}", key));
        }

        // Errors come back as JSON bodies with 4xx codes, so don't bail on status
        let response = request.send().await.map_err(TubelinkError::NetworkError)?;
        let http_status = response.status();
        let parsed: ResolveResponse = response.json().await.map_err(TubelinkError::NetworkError)?;
        debug!("resolver-api answered {} / {}", http_status, parsed.status);

        match (parsed.status.as_str(), parsed.url) {
            ("tunnel" | "redirect" | "stream", Some(url)) if !url.is_empty() => {
                let title = parsed.filename.as_deref().and_then(title_from_filename);
                let quality = format!("{}p", self.settings.quality);
                Ok(DownloadInfo::new(self.id(), url, quality).with_title(title))
            }
            ("error", _) => Err(TubelinkError::ExtractionError(format!(
                "resolver-api error: {}",
                parsed.error.map(|e| e.code).unwrap_or_else(|| "unknown".into())
            ))
            .into()),
            (status, _) => Err(TubelinkError::ExtractionError(format!(
                "resolver-api returned unusable status {} (HTTP {})",
                status, http_status
            ))
            .into()),
        }
    }
}
