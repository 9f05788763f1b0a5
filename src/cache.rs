//! Named, install-once cache for the application shell.
//!
//! Populated in one step at install; lookups are cache-first with a fall
//! through to the origin. Fallback reads are not stored and nothing is ever
//! revalidated or evicted, so a new shell needs a new cache name.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CacheError;

pub const CACHE_NAME: &str = "reel-extractor-v1";
pub const SHELL_ASSETS: &[&str] = &["/", "/index.html", "/static/main.js", "/manifest.json"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Where assets come from when the cache does not have them.
#[async_trait]
pub trait AssetOrigin: Send + Sync {
    async fn load(&self, path: &str) -> Result<Asset, CacheError>;
}

// ── Directory origin ─────────────────────────────────────────────────────────

pub struct DirOrigin {
    root: PathBuf,
}

impl DirOrigin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a request path to a file under the root. `/` and directory paths
    /// resolve to `index.html`; anything escaping the root is rejected.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let trimmed = path.split(['?', '#']).next().unwrap_or("");
        let mut relative = PathBuf::new();
        for component in Path::new(trimmed.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if trimmed.is_empty() || trimmed.ends_with('/') {
            relative.push("index.html");
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl AssetOrigin for DirOrigin {
    async fn load(&self, path: &str) -> Result<Asset, CacheError> {
        let file = self
            .resolve(path)
            .ok_or_else(|| CacheError::NotFound(path.to_string()))?;
        // A directory without a trailing slash is not an asset.
        if tokio::fs::metadata(&file).await.is_ok_and(|m| m.is_dir()) {
            return Err(CacheError::NotFound(path.to_string()));
        }
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(Asset {
                bytes,
                content_type: content_type_for(&file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CacheError::NotFound(path.to_string()))
            }
            Err(source) => Err(CacheError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

// ── Cache ────────────────────────────────────────────────────────────────────

pub struct AssetCache<O: AssetOrigin> {
    name: String,
    manifest: Vec<String>,
    origin: O,
    entries: RwLock<HashMap<String, Asset>>,
}

impl<O: AssetOrigin> AssetCache<O> {
    pub fn new(origin: O) -> Self {
        Self::with_manifest(CACHE_NAME, SHELL_ASSETS, origin)
    }

    pub fn with_manifest(name: &str, manifest: &[&str], origin: O) -> Self {
        Self {
            name: name.to_string(),
            manifest: manifest.iter().map(|p| p.to_string()).collect(),
            origin,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch every manifest path and store them together. If any path
    /// fails nothing is stored.
    pub async fn install(&self) -> Result<usize, CacheError> {
        let mut fetched = Vec::with_capacity(self.manifest.len());
        for path in &self.manifest {
            let asset = self
                .origin
                .load(path)
                .await
                .map_err(|source| CacheError::Install {
                    cache: self.name.clone(),
                    source: Box::new(source),
                })?;
            fetched.push((path.clone(), asset));
        }

        let count = fetched.len();
        self.entries.write().await.extend(fetched);
        tracing::info!(cache = %self.name, assets = count, "asset cache installed");
        Ok(count)
    }

    /// Cache first, origin second.
    pub async fn fetch(&self, path: &str) -> Result<Asset, CacheError> {
        if let Some(asset) = self.entries.read().await.get(path) {
            tracing::debug!(path, "cache hit");
            return Ok(asset.clone());
        }
        tracing::debug!(path, "cache miss, loading from origin");
        self.origin.load(path).await
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
