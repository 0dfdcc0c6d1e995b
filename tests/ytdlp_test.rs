//! yt-dlp strategies against a fake yt-dlp shell script.
//!
//! Everything runs inside one test so no other thread forks while the
//! script is still open for writing.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use tubelink::extractor::{ytdlp, Extractor, HybridExtractor, VideoTarget, YtDlpExtractor};
use tubelink::server::{router, AppState};
use tubelink::utils::config::YtDlpSelector;
use tubelink::TubelinkError;

const FAKE_YTDLP: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "2024.08.06"
  exit 0
fi
# $1 = -f, $2 = selector
case "$2" in
  18)
    echo '{"url":"https://cdn.example/18.mp4","title":"Fake Video","format_note":"360p","height":360}'
    ;;
  merged)
    echo '{"title":"Fake Video","requested_formats":[{"url":"v"},{"url":"a"}]}'
    ;;
  slow)
    sleep 10
    ;;
  garbage)
    echo 'this is not json'
    ;;
  *)
    echo "ERROR: [youtube] dQw4w9WgXcQ: Requested format is not available" >&2
    exit 1
    ;;
esac
"#;

fn write_fake(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("yt-dlp");
    std::fs::write(&path, FAKE_YTDLP).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

fn strategy(path: &Path, name: &str, format: &str) -> YtDlpExtractor {
    YtDlpExtractor::new(path.to_path_buf(), YtDlpSelector::new(name, format, None))
}

#[tokio::test]
async fn fake_ytdlp_scenarios() {
    let dir = TempDir::new().expect("temp dir");
    let fake = write_fake(&dir);
    let target = VideoTarget::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();

    // discovery honours an explicit executable path
    assert_eq!(ytdlp::find_ytdlp(Some(fake.as_path())).as_deref(), Some(fake.as_path()));
    assert_eq!(
        ytdlp::ytdlp_version(&fake).await.as_deref(),
        Some("2024.08.06")
    );

    // /health reports the version of the configured binary
    let app = router(Arc::new(AppState::new(
        HybridExtractor::default(),
        Some(fake.clone()),
    )));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["yt_dlp_version"], "2024.08.06");

    // single progressive format
    let info = strategy(&fake, "ytdlp-itag18", "18")
        .resolve(&target)
        .await
        .unwrap();
    assert_eq!(info.url, "https://cdn.example/18.mp4");
    assert_eq!(info.quality, "360p");
    assert_eq!(info.title.as_deref(), Some("Fake Video"));
    assert_eq!(info.strategy, "ytdlp-itag18");

    // non-zero exit carries stderr
    let err = strategy(&fake, "ytdlp-progressive", "best[ext=mp4]")
        .resolve(&target)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Requested format is not available"));

    // merged selections have no single URL
    let err = strategy(&fake, "ytdlp-merged", "merged")
        .resolve(&target)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TubelinkError>(),
        Some(TubelinkError::NoStream(_))
    ));

    assert!(strategy(&fake, "ytdlp-garbage", "garbage")
        .resolve(&target)
        .await
        .is_err());

    // a hung subprocess is abandoned and the chain moves on
    let chain = HybridExtractor::default()
        .with(
            Arc::new(strategy(&fake, "ytdlp-slow", "slow")),
            Duration::from_millis(300),
        )
        .with(
            Arc::new(strategy(&fake, "ytdlp-progressive", "best")),
            Duration::from_secs(5),
        )
        .with(
            Arc::new(strategy(&fake, "ytdlp-itag18", "18")),
            Duration::from_secs(5),
        );
    let started = Instant::now();
    let info = chain.resolve(&target).await.unwrap();
    assert_eq!(info.strategy, "ytdlp-itag18");
    assert!(started.elapsed() < Duration::from_secs(5));

    // the last strategy timing out is reported as such
    let chain = HybridExtractor::default().with(
        Arc::new(strategy(&fake, "ytdlp-slow", "slow")),
        Duration::from_millis(300),
    );
    let err = chain.resolve(&target).await.unwrap_err();
    assert!(matches!(err, TubelinkError::Timeout { ref strategy, .. } if strategy == "ytdlp-slow"));
}
