use crate::extractor::models::{quality_label, DownloadInfo, VideoTarget};
use crate::extractor::traits::Extractor;
use crate::utils::config::NativeSettings;
use crate::utils::error::TubelinkError;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    video_details: Option<VideoDetails>,
    streaming_data: Option<StreamingData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    title: Option<String>,
}

/// `adaptiveFormats` are video-only or audio-only and never read
#[derive(Debug, Default, Deserialize)]
struct StreamingData {
    #[serde(default)]
    formats: Vec<StreamFormat>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamFormat {
    /// Absent when the stream is behind a signature cipher
    url: Option<String>,
    #[serde(default)]
    mime_type: String,
    quality_label: Option<String>,
    height: Option<u32>,
}

impl StreamFormat {
    fn is_mp4(&self) -> bool {
        self.mime_type.starts_with("video/mp4")
    }

    fn has_url(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// Talks to the InnerTube `player` endpoint directly
///
/// The ANDROID client context returns plain stream URLs for most videos,
/// so no signature deciphering is attempted here.
pub struct NativeYoutubeExtractor {
    client: reqwest::Client,
    settings: NativeSettings,
}

impl NativeYoutubeExtractor {
    pub fn new(client: reqwest::Client, settings: NativeSettings) -> Self {
        Self { client, settings }
    }

    fn player_url(&self) -> String {
        format!(
            "{}/youtubei/v1/player?prettyPrint=false",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn player_request(&self, video_id: &str) -> serde_json::Value {
        json!({
            "videoId": video_id,
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": self.settings.client_version,
                    "androidSdkVersion": 30,
                    "hl": "en",
                    "gl": "US",
                }
            },
            "contentCheckOk": true,
            "racyCheckOk": true,
        })
    }

    fn user_agent(&self) -> String {
        format!(
            "com.google.android.youtube/{} (Linux; U; Android 11) gzip",
            self.settings.client_version
        )
    }
}

/// Highest progressive mp4 first, then the highest progressive stream in any container
fn pick_stream(data: &StreamingData) -> Option<&StreamFormat> {
    let by_height = |f: &&StreamFormat| f.height.unwrap_or(0);
    let progressive = || {
        data.formats
            .iter()
            .filter(|f| f.has_url() && f.mime_type.starts_with("video/"))
    };

    progressive()
        .filter(|f| f.is_mp4())
        .max_by_key(by_height)
        .or_else(|| progressive().max_by_key(by_height))
}

#[async_trait]
impl Extractor for NativeYoutubeExtractor {
    fn id(&self) -> &str {
        "native-youtube"
    }

    async fn resolve(&self, target: &VideoTarget) -> Result<DownloadInfo> {
        info!("NativeYoutubeExtractor invoked for: {}", target.video_id);

        let response = self
            .client
            .post(self.player_url())
            .header(reqwest::header::USER_AGENT, self.user_agent())
            .json(&self.player_request(target.video_id.as_str()))
            .send()
            .await
            .map_err(TubelinkError::NetworkError)?
            .error_for_status()
            .map_err(TubelinkError::NetworkError)?;

        let player: PlayerResponse = response.json().await.map_err(TubelinkError::NetworkError)?;

        let playability = player
            .playability_status
            .ok_or_else(|| anyhow!("player response has no playabilityStatus"))?;
        if playability.status != "OK" {
            return Err(TubelinkError::ExtractionError(format!(
                "video not playable: {} ({})",
                playability.status,
                playability.reason.unwrap_or_default()
            ))
            .into());
        }

        let title = player.video_details.and_then(|d| d.title);
        debug!("Title: {:?}", title);

        let streaming = player.streaming_data.unwrap_or_default();
        let stream = pick_stream(&streaming).ok_or_else(|| {
            TubelinkError::NoStream("no stream with a plain URL in player response".into())
        })?;

        let url = stream.url.clone().unwrap_or_default();
        let quality = quality_label(stream.quality_label.as_deref(), stream.height);

        Ok(DownloadInfo::new(self.id(), url, quality).with_title(title))
    }
}
