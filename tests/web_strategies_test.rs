//! The HTTP-backed strategies against in-process mock services.

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use tubelink::extractor::{
    Extractor, InvidiousExtractor, NativeYoutubeExtractor, ResolverApiExtractor, VideoTarget,
};
use tubelink::utils::config::{NativeSettings, ResolverApiSettings};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn target() -> VideoTarget {
    VideoTarget::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL1").unwrap()
}

fn native(base_url: String) -> NativeYoutubeExtractor {
    NativeYoutubeExtractor::new(
        reqwest::Client::new(),
        NativeSettings {
            base_url,
            ..Default::default()
        },
    )
}

fn resolver(endpoint: String, api_key: Option<&str>) -> ResolverApiExtractor {
    ResolverApiExtractor::new(
        reqwest::Client::new(),
        ResolverApiSettings {
            endpoint,
            api_key: api_key.map(String::from),
            ..Default::default()
        },
    )
}

// ============================================================
// InnerTube player
// ============================================================

#[tokio::test]
async fn native_picks_progressive_mp4() {
    let app = Router::new().route(
        "/youtubei/v1/player",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["videoId"], "dQw4w9WgXcQ");
            Json(json!({
                "playabilityStatus": { "status": "OK" },
                "videoDetails": { "title": "Never Gonna Give You Up" },
                "streamingData": {
                    "formats": [
                        { "itag": 18, "url": "https://cdn/18", "mimeType": "video/mp4; codecs=\"avc1\"", "qualityLabel": "360p", "height": 360 }
                    ],
                    "adaptiveFormats": [
                        { "itag": 137, "url": "https://cdn/137", "mimeType": "video/mp4", "qualityLabel": "1080p", "height": 1080 }
                    ]
                }
            }))
        }),
    );
    let base = spawn(app).await;

    let info = native(base).resolve(&target()).await.unwrap();
    assert_eq!(info.url, "https://cdn/18");
    assert_eq!(info.quality, "360p");
    assert_eq!(info.title.as_deref(), Some("Never Gonna Give You Up"));
    assert_eq!(info.strategy, "native-youtube");
}

#[tokio::test]
async fn native_rejects_unplayable_video() {
    let app = Router::new().route(
        "/youtubei/v1/player",
        post(|| async {
            Json(json!({
                "playabilityStatus": { "status": "LOGIN_REQUIRED", "reason": "Sign in to confirm you're not a bot" }
            }))
        }),
    );
    let base = spawn(app).await;

    let err = native(base).resolve(&target()).await.unwrap_err();
    assert!(err.to_string().contains("LOGIN_REQUIRED"), "{}", err);
}

#[tokio::test]
async fn native_fails_on_http_error() {
    let app = Router::new().route(
        "/youtubei/v1/player",
        post(|| async { StatusCode::TOO_MANY_REQUESTS }),
    );
    let base = spawn(app).await;
    assert!(native(base).resolve(&target()).await.is_err());
}

// ============================================================
// Resolution API
// ============================================================

#[tokio::test]
async fn resolver_accepts_tunnel_and_sends_key() {
    let app = Router::new().route(
        "/",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(headers["authorization"], "Api-Key secret");
            assert_eq!(headers["accept"], "application/json");
            // canonical URL, playlist stripped
            assert_eq!(body["url"], "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
            assert_eq!(body["videoQuality"], "720");
            Json(json!({
                "status": "tunnel",
                "url": "https://resolver/tunnel?id=abc",
                "filename": "Never Gonna Give You Up (720p, h264).mp4"
            }))
        }),
    );
    let base = spawn(app).await;

    let info = resolver(format!("{}/", base), Some("secret"))
        .resolve(&target())
        .await
        .unwrap();
    assert_eq!(info.url, "https://resolver/tunnel?id=abc");
    assert_eq!(info.quality, "720p");
    assert_eq!(
        info.title.as_deref(),
        Some("Never Gonna Give You Up (720p, h264)")
    );
}

#[tokio::test]
async fn resolver_surfaces_error_code() {
    let app = Router::new().route(
        "/",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "error": { "code": "error.api.youtube.login" } })),
            )
        }),
    );
    let base = spawn(app).await;

    let err = resolver(format!("{}/", base), None)
        .resolve(&target())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("error.api.youtube.login"), "{}", err);
}

#[tokio::test]
async fn resolver_rejects_picker() {
    let app = Router::new().route(
        "/",
        post(|| async { Json(json!({ "status": "picker", "picker": [] })) }),
    );
    let base = spawn(app).await;
    assert!(resolver(format!("{}/", base), None)
        .resolve(&target())
        .await
        .is_err());
}

// ============================================================
// Invidious
// ============================================================

#[tokio::test]
async fn invidious_picks_best_mp4_stream() {
    let app = Router::new().route(
        "/api/v1/videos/{id}",
        get(
            |Path(id): Path<String>, Query(query): Query<HashMap<String, String>>| async move {
                assert_eq!(id, "dQw4w9WgXcQ");
                assert_eq!(query["fields"], "title,formatStreams");
                Json(json!({
                    "title": "Never Gonna Give You Up",
                    "formatStreams": [
                        { "url": "https://inv/360", "qualityLabel": "360p", "resolution": "360p", "container": "mp4" },
                        { "url": "https://inv/720", "qualityLabel": "720p", "resolution": "720p", "container": "mp4" }
                    ]
                }))
            },
        ),
    );
    let base = spawn(app).await;

    let extractor = InvidiousExtractor::new(reqwest::Client::new(), &base);
    assert!(extractor.id().starts_with("invidious:127.0.0.1:"));
    let info = extractor.resolve(&target()).await.unwrap();
    assert_eq!(info.url, "https://inv/720");
    assert_eq!(info.quality, "720p");
}

#[tokio::test]
async fn invidious_without_streams_fails() {
    let app = Router::new().route(
        "/api/v1/videos/{id}",
        get(|| async { Json(json!({ "title": "x", "formatStreams": [] })) }),
    );
    let base = spawn(app).await;

    let err = InvidiousExtractor::new(reqwest::Client::new(), &base)
        .resolve(&target())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No downloadable stream"), "{}", err);
}
