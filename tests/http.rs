use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::StatusCode, routing::{get, post}, Json, Router};
use serde_json::{json, Value};
use url::Url;

use reel_extractor::cache::{AssetCache, DirOrigin, CACHE_NAME};
use reel_extractor::client::ExtractionClient;
use reel_extractor::error::ExtractError;
use reel_extractor::probe::first_success;
use reel_extractor::server;
use reel_extractor::transport::{HttpTransport, Transport};

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn fake_backend(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match body.get("url").and_then(Value::as_str) {
        Some(url) if url.contains("/reel/") => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "video_url": "https://cdn.test/video.mp4",
                "shortcode": "Cabc123",
                "timestamp": 1700000000
            })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid Instagram URL"})),
        ),
    }
}

fn backend_router() -> Router {
    Router::new()
        .route("/api/extract-reel", post(fake_backend))
        .route("/broken", post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }))
        .route("/text", get(|| async { "hello" }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
}

fn client_for(addr: SocketAddr, path: &str) -> ExtractionClient<HttpTransport> {
    ExtractionClient::new(
        HttpTransport::new(false).unwrap(),
        Url::parse(&format!("http://{}{}", addr, path)).unwrap(),
    )
}

#[tokio::test]
async fn extracts_against_live_backend() {
    let addr = spawn(backend_router()).await;
    let client = client_for(addr, "/api/extract-reel");

    let video = client
        .extract("  https://www.instagram.com/reel/Cabc123/ ")
        .await
        .unwrap();
    assert_eq!(video.video_url.as_deref(), Some("https://cdn.test/video.mp4"));
    assert_eq!(video.shortcode.as_deref(), Some("Cabc123"));

    let err = client.extract("https://example.com/").await.unwrap_err();
    assert_eq!(err, ExtractError::BackendError("Invalid Instagram URL".into()));
}

#[tokio::test]
async fn non_json_reply_is_malformed() {
    let addr = spawn(backend_router()).await;
    let err = client_for(addr, "/broken")
        .extract("https://www.instagram.com/reel/x/")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ExtractError::MalformedResponse {
            status: 502,
            body: "upstream down".into()
        }
    );
}

#[tokio::test]
async fn unreachable_backend_is_connection_failure() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr, "/api/extract-reel")
        .extract("https://www.instagram.com/reel/x/")
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::ConnectionFailure(_)));
}

#[tokio::test]
async fn probe_skips_failed_endpoint() {
    let addr = spawn(backend_router()).await;
    let transport = HttpTransport::new(false).unwrap();
    let candidates = vec![
        Url::parse(&format!("http://{}/missing", addr)).unwrap(),
        Url::parse(&format!("http://{}/text", addr)).unwrap(),
    ];

    let hit = first_success(&transport, &candidates).await.unwrap();
    assert_eq!(hit.body, "hello");
    assert_eq!(hit.endpoint, candidates[1]);
    assert!(transport.get(&candidates[0]).await.unwrap().status == 404);
}

#[tokio::test]
async fn serves_shell_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("static")).unwrap();
    fs::write(dir.path().join("index.html"), "<html>shell</html>").unwrap();
    fs::write(dir.path().join("static/main.js"), "init()").unwrap();
    fs::write(dir.path().join("manifest.json"), r#"{"name":"Reel"}"#).unwrap();

    let cache = Arc::new(AssetCache::new(DirOrigin::new(dir.path())));
    cache.install().await.unwrap();
    assert_eq!(cache.name(), CACHE_NAME);
    let addr = spawn(server::router(cache)).await;

    // Served from the cache even after the file changes on disk.
    fs::write(dir.path().join("index.html"), "<html>changed</html>").unwrap();

    let http = reqwest::Client::new();
    let resp = http.get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"],
        "text/html; charset=utf-8"
    );
    assert_eq!(resp.text().await.unwrap(), "<html>shell</html>");

    let health: Value = serde_json::from_str(
        &http
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(health, json!({"status": "ok"}));

    let missing = http
        .get(format!("http://{}/nope.txt", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}
