//! yt-dlp wrapper for download-URL resolution
//!
//! Each `YtDlpExtractor` runs one yt-dlp invocation with a fixed format
//! selector. Several of them with different selectors form consecutive
//! entries of the fallback chain.

use crate::extractor::models::{quality_label, DownloadInfo, VideoTarget};
use crate::extractor::traits::Extractor;
use crate::utils::config::YtDlpSelector;
use crate::utils::error::TubelinkError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info, warn};

/// The subset of `--dump-single-json` output we read
#[derive(Debug, Deserialize)]
struct SelectedFormat {
    url: Option<String>,
    title: Option<String>,
    format_note: Option<String>,
    resolution: Option<String>,
    height: Option<u32>,
}

/// One yt-dlp invocation with a fixed format selector
pub struct YtDlpExtractor {
    ytdlp_path: PathBuf,
    selector: YtDlpSelector,
}

impl YtDlpExtractor {
    pub fn new(ytdlp_path: PathBuf, selector: YtDlpSelector) -> Self {
        Self {
            ytdlp_path,
            selector,
        }
    }

    fn command(&self, url: &str) -> AsyncCommand {
        let mut cmd = AsyncCommand::new(&self.ytdlp_path);
        cmd.arg("-f")
            .arg(&self.selector.format)
            .arg("--dump-single-json")
            .arg("--no-warnings")
            .arg("--no-playlist");
        if let Some(retries) = self.selector.retries {
            cmd.arg("--retries").arg(retries.to_string());
        }
        cmd.arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // dropped on timeout, so the child must not outlive the future
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn id(&self) -> &str {
        &self.selector.name
    }

    /// Uses: yt-dlp -f <selector> --dump-single-json --no-playlist
    async fn resolve(&self, target: &VideoTarget) -> Result<DownloadInfo> {
        let url = target.watch_url();
        debug!("Running yt-dlp -f {} for {}", self.selector.format, url);

        let output = self
            .command(&url)
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.ytdlp_path.display()))?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp extraction failed: {}", error_msg.trim());
            return Err(TubelinkError::ExtractionError(error_msg.trim().to_string()).into());
        }

        let selected: SelectedFormat = serde_json::from_slice(&output.stdout)
            .map_err(TubelinkError::SerializationError)?;

        // Merged selections come back as requested_formats with no top-level url
        let direct = selected
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                TubelinkError::NoStream(format!(
                    "selector {} did not yield a single progressive stream",
                    self.selector.format
                ))
            })?;

        let quality = quality_label(selected.format_note.as_deref(), selected.height);
        let quality = if quality == "best" {
            selected.resolution.unwrap_or(quality)
        } else {
            quality
        };

        Ok(DownloadInfo::new(self.id(), direct, quality).with_title(selected.title))
    }
}

/// Report the yt-dlp version, bounded so health checks never hang
pub async fn ytdlp_version(path: &Path) -> Option<String> {
    let run = AsyncCommand::new(path)
        .arg("--version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(Duration::from_secs(5), run).await {
        Ok(Ok(output)) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!version.is_empty()).then_some(version)
        }
        Ok(Ok(output)) => {
            warn!("yt-dlp --version exited with {}", output.status);
            None
        }
        Ok(Err(e)) => {
            warn!("yt-dlp --version failed: {}", e);
            None
        }
        Err(_) => {
            warn!("yt-dlp --version timed out");
            None
        }
    }
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Configured path
/// 2. System PATH
/// 3. Common installation paths
pub fn find_ytdlp(preferred: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = preferred {
        if is_executable(path) {
            info!("✓ Using configured yt-dlp: {:?}", path);
            return Some(path.to_path_buf());
        }
        warn!("Configured yt-dlp is not executable: {:?}", path);
    }

    if let Some(system) = find_in_path() {
        info!("✓ Using system yt-dlp: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        info!("✓ Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("✗ yt-dlp not found anywhere!");
    None
}

fn find_in_path() -> Option<PathBuf> {
    which::which("yt-dlp").ok().filter(|path| path.exists())
}

fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
        "/opt/homebrew/bin/yt-dlp",
        // pip --user
        "~/.local/bin/yt-dlp",
    ];

    for path_str in common_paths {
        let expanded = match path_str.strip_prefix("~/") {
            Some(rest) => match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            },
            None => PathBuf::from(path_str),
        };

        if is_executable(&expanded) {
            return Some(expanded);
        }
    }

    None
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

// ============================================================
// Tests
// ============================================================
