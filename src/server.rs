use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::cache::{AssetCache, AssetOrigin, DirOrigin};
use crate::error::CacheError;

pub fn router<O: AssetOrigin + 'static>(cache: Arc<AssetCache<O>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(shell::<O>)
        .with_state(cache)
}

/// Install the shell cache from `root` and serve it on `addr` until the
/// process exits.
pub async fn serve(addr: SocketAddr, root: PathBuf) -> std::io::Result<()> {
    let cache = Arc::new(AssetCache::new(DirOrigin::new(&root)));
    if let Err(e) = cache.install().await {
        tracing::warn!(root = %root.display(), error = %e, "shell cache not installed, serving uncached");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(cache)).await
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn shell<O: AssetOrigin>(State(cache): State<Arc<AssetCache<O>>>, uri: Uri) -> Response {
    match cache.fetch(uri.path()).await {
        Ok(asset) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, asset.content_type)],
            asset.bytes,
        )
            .into_response(),
        Err(CacheError::NotFound(path)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": format!("{} not found", path)})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(path = uri.path(), error = %e, "asset load failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "asset load failed"})),
            )
                .into_response()
        }
    }
}
