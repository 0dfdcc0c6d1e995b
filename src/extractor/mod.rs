pub mod hybrid;
pub mod models;
pub mod native;
pub mod traits;
pub mod web;
pub mod ytdlp;

pub use hybrid::{HybridExtractor, Strategy};
pub use models::{DownloadInfo, VideoId, VideoTarget};
pub use native::NativeYoutubeExtractor;
pub use traits::Extractor;
pub use web::{InvidiousExtractor, ResolverApiExtractor};
pub use ytdlp::YtDlpExtractor;

use crate::utils::config::{secs, AppSettings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the fallback chain in its fixed order:
/// native client, resolver API, yt-dlp selectors, Invidious instances.
///
/// `ytdlp_path` is the already-located binary; when it is `None` the yt-dlp
/// strategies are left out.
pub fn build_chain(
    settings: &AppSettings,
    client: &reqwest::Client,
    ytdlp_path: Option<&PathBuf>,
) -> HybridExtractor {
    let mut chain = HybridExtractor::default();

    if settings.native.enabled {
        chain = chain.with(
            Arc::new(NativeYoutubeExtractor::new(
                client.clone(),
                settings.native.clone(),
            )),
            secs(settings.native.timeout_secs),
        );
    }

    if settings.resolver_api.enabled && !settings.resolver_api.endpoint.trim().is_empty() {
        chain = chain.with(
            Arc::new(ResolverApiExtractor::new(
                client.clone(),
                settings.resolver_api.clone(),
            )),
            secs(settings.resolver_api.timeout_secs),
        );
    }

    if settings.ytdlp.enabled {
        match ytdlp_path {
            Some(path) => {
                for selector in &settings.ytdlp.selectors {
                    chain = chain.with(
                        Arc::new(YtDlpExtractor::new(path.clone(), selector.clone())),
                        secs(settings.ytdlp.timeout_secs),
                    );
                }
            }
            None => warn!("yt-dlp not available, skipping its strategies"),
        }
    }

    if settings.invidious.enabled {
        for instance in &settings.invidious.instances {
            chain = chain.with(
                Arc::new(InvidiousExtractor::new(client.clone(), instance)),
                secs(settings.invidious.timeout_secs),
            );
        }
    }

    info!("Strategy order: {}", chain.strategy_names().join(" -> "));
    chain
}
