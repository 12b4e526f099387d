//! Disk-backed asset fetching.
//!
//! # Responsibilities
//! - Map route paths onto files under the build's static directory
//! - Refuse path traversal out of that directory
//! - Attach a content type derived from the file extension
//!
//! # Design Decisions
//! - A missing file is a fetch failure, not a routing miss; by the time
//!   an asset is fetched the entry map has already vouched for it

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderValue, Response as HttpResponse};
use axum::response::Response;

use crate::serve::{AssetFetcher, ServeError};

/// Serves assets from the build output's static directory.
#[derive(Debug, Clone)]
pub struct DiskAssets {
    root: PathBuf,
}

impl DiskAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a route path to a file path, rejecting any component that
    /// would escape the root.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let relative = url_path.trim_start_matches('/');
        let mut resolved = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(segment) => resolved.push(segment),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }
}

/// Content type for a served file, by extension.
fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
        .as_str()
    {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl AssetFetcher for DiskAssets {
    async fn fetch(&self, path: &str) -> Result<Response, ServeError> {
        let file = self.map_path(path).ok_or_else(|| ServeError::Asset {
            path: path.to_string(),
            reason: "path escapes the asset root".to_string(),
        })?;

        let bytes = tokio::fs::read(&file)
            .await
            .map_err(|e| ServeError::Asset {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let mut response = HttpResponse::new(Body::from(bytes));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type(&file)),
        );
        Ok(response)
    }
}
