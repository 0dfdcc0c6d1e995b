//! Invidious instance API

use crate::extractor::models::{quality_label, DownloadInfo, VideoTarget};
use crate::extractor::traits::Extractor;
use crate::utils::error::TubelinkError;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResponse {
    title: Option<String>,
    #[serde(default)]
    format_streams: Vec<FormatStream>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormatStream {
    /// Missing on some proxied or ciphered entries
    url: Option<String>,
    quality_label: Option<String>,
    /// e.g. "720p"
    resolution: Option<String>,
    container: Option<String>,
}

impl FormatStream {
    fn direct_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    fn height(&self) -> u32 {
        self.resolution
            .as_deref()
            .or(self.quality_label.as_deref())
            .and_then(|r| {
                r.chars()
                    .take_while(char::is_ascii_digit)
                    .collect::<String>()
                    .parse()
                    .ok()
            })
            .unwrap_or(0)
    }
}

/// One Invidious instance; each configured instance is its own chain entry
pub struct InvidiousExtractor {
    client: reqwest::Client,
    instance: String,
    id: String,
}

impl InvidiousExtractor {
    pub fn new(client: reqwest::Client, instance: &str) -> Self {
        let instance = instance.trim().trim_end_matches('/').to_string();
        let host = instance
            .split_once("://")
            .map_or(instance.as_str(), |(_, rest)| rest)
            .to_string();
        Self {
            client,
            id: format!("invidious:{}", host),
            instance,
        }
    }
}

fn pick_stream(streams: &[FormatStream]) -> Option<&FormatStream> {
    let usable = || streams.iter().filter(|s| s.direct_url().is_some());
    usable()
        .filter(|s| s.container.as_deref() == Some("mp4"))
        .max_by_key(|s| s.height())
        .or_else(|| usable().max_by_key(|s| s.height()))
}

#[async_trait]
impl Extractor for InvidiousExtractor {
    fn id(&self) -> &str {
        &self.id
    }

    async fn resolve(&self, target: &VideoTarget) -> Result<DownloadInfo> {
        let url = format!(
            "{}/api/v1/videos/{}?fields=title,formatStreams",
            self.instance, target.video_id
        );
        debug!("GET {}", url);

        let video: VideoResponse = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(TubelinkError::NetworkError)?
            .error_for_status()
            .map_err(TubelinkError::NetworkError)?
            .json()
            .await
            .map_err(TubelinkError::NetworkError)?;

        let stream = pick_stream(&video.format_streams).ok_or_else(|| {
            TubelinkError::NoStream(format!("{} listed no format streams", self.instance))
        })?;

        let quality = quality_label(
            stream.quality_label.as_deref().or(stream.resolution.as_deref()),
            None,
        );

        let direct = stream.direct_url().unwrap_or_default().to_string();
        Ok(DownloadInfo::new(self.id(), direct, quality).with_title(video.title))
    }
}
