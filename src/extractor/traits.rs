use crate::extractor::models::{DownloadInfo, VideoTarget};
use anyhow::Result;
use async_trait::async_trait;

/// Core trait for all download-URL strategies
///
/// This trait isolates the dispatcher from the specific extraction method
/// (InnerTube client, yt-dlp subprocess, third-party web API, etc.).
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this strategy (e.g., "native-youtube", "ytdlp-best")
    fn id(&self) -> &str;

    /// Resolves a direct download URL for the target video
    ///
    /// Any error means "try the next strategy"; the dispatcher only logs it.
    async fn resolve(&self, target: &VideoTarget) -> Result<DownloadInfo>;
}
