//! Application configuration

use crate::utils::error::TubelinkError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application settings
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    pub native: NativeSettings,
    pub resolver_api: ResolverApiSettings,
    pub ytdlp: YtDlpSettings,
    pub invidious: InvidiousSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            native: NativeSettings::default(),
            resolver_api: ResolverApiSettings::default(),
            ytdlp: YtDlpSettings::default(),
            invidious: InvidiousSettings::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, TubelinkError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, TubelinkError> {
        let mut settings: AppSettings =
            toml::from_str(raw).map_err(|e| TubelinkError::ConfigError(e.to_string()))?;
        settings.validate();
        Ok(settings)
    }

    /// Enforce sane minimums
    pub fn validate(&mut self) {
        for timeout in [
            &mut self.native.timeout_secs,
            &mut self.resolver_api.timeout_secs,
            &mut self.ytdlp.timeout_secs,
            &mut self.invidious.timeout_secs,
        ] {
            if *timeout == 0 {
                *timeout = 1;
            }
        }
        self.invidious
            .instances
            .retain(|instance| !instance.trim().is_empty());
    }
}

/// InnerTube player client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeSettings {
    pub enabled: bool,
    pub base_url: String,
    pub client_version: String,
    pub timeout_secs: u64,
}

impl Default for NativeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.youtube.com".to_string(),
            client_version: "19.09.37".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Cobalt-compatible resolution API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverApiSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Requested vertical resolution, e.g. "720"
    pub quality: String,
    pub timeout_secs: u64,
}

impl Default for ResolverApiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.cobalt.tools/".to_string(),
            api_key: None,
            quality: "720".to_string(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YtDlpSettings {
    pub enabled: bool,
    /// Explicit binary; otherwise PATH and common locations are searched
    pub path: Option<PathBuf>,
    /// Tried in order, each one a separate strategy
    pub selectors: Vec<YtDlpSelector>,
    pub timeout_secs: u64,
}

impl Default for YtDlpSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            selectors: vec![
                YtDlpSelector::new(
                    "ytdlp-progressive",
                    "best[ext=mp4][vcodec!=none][acodec!=none]",
                    None,
                ),
                // 360p mp4, the one itag that is nearly always progressive
                YtDlpSelector::new("ytdlp-itag18", "18", None),
                YtDlpSelector::new("ytdlp-best", "best", Some(3)),
            ],
            timeout_secs: 90,
        }
    }
}

/// One yt-dlp invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YtDlpSelector {
    pub name: String,
    pub format: String,
    #[serde(default)]
    pub retries: Option<u32>,
}

impl YtDlpSelector {
    pub fn new(name: &str, format: &str, retries: Option<u32>) -> Self {
        Self {
            name: name.to_string(),
            format: format.to_string(),
            retries,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvidiousSettings {
    pub enabled: bool,
    pub instances: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for InvidiousSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            instances: vec![
                "https://inv.nadeko.net".to_string(),
                "https://yewtu.be".to_string(),
            ],
            timeout_secs: 10,
        }
    }
}

/// Converts a seconds setting into a timeout
pub fn secs(value: u64) -> Duration {
    Duration::from_secs(value.max(1))
}

/// Default location of the optional config file
/// - Linux: ~/.config/tubelink/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tubelink").join("config.toml"))
}
