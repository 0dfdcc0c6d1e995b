use crate::extractor::models::{DownloadInfo, VideoTarget};
use crate::extractor::traits::Extractor;
use crate::utils::error::TubelinkError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One entry of the fallback chain
#[derive(Clone)]
pub struct Strategy {
    pub extractor: Arc<dyn Extractor>,
    pub timeout: Duration,
}

/// The Hybrid Extractor chain
///
/// Holds the configured strategies in order and tries them one by one,
/// returning the first direct URL any of them produces.
#[derive(Clone, Default)]
pub struct HybridExtractor {
    strategies: Vec<Strategy>,
}

impl HybridExtractor {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    /// Append a strategy to the end of the chain
    pub fn with(mut self, extractor: Arc<dyn Extractor>, timeout: Duration) -> Self {
        self.strategies.push(Strategy { extractor, timeout });
        self
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies
            .iter()
            .map(|s| s.extractor.id().to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Resolve a download URL using the first strategy that succeeds
    pub async fn resolve(&self, target: &VideoTarget) -> Result<DownloadInfo, TubelinkError> {
        let mut last_timeout = None;

        for strategy in &self.strategies {
            let id = strategy.extractor.id();
            debug!("Trying strategy {} for {}", id, target.video_id);

            let attempt = tokio::time::timeout(strategy.timeout, strategy.extractor.resolve(target));
            match attempt.await {
                Ok(Ok(info)) if !info.url.trim().is_empty() => {
                    info!("✅ Got download URL via {} - Quality: {}", id, info.quality);
                    return Ok(info);
                }
                Ok(Ok(_)) => {
                    warn!("Strategy {} returned an empty URL", id);
                    last_timeout = None;
                }
                Ok(Err(e)) => {
                    warn!("Strategy {} failed: {:#}", id, e);
                    last_timeout = None;
                }
                Err(_) => {
                    warn!(
                        "Strategy {} timed out after {}s",
                        id,
                        strategy.timeout.as_secs_f32()
                    );
                    last_timeout = Some(TubelinkError::Timeout {
                        strategy: id.to_string(),
                        secs: strategy.timeout.as_secs(),
                    });
                }
            }
        }

        Err(last_timeout.unwrap_or(TubelinkError::Exhausted {
            attempted: self.strategies.len(),
        }))
    }
}
