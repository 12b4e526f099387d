//! Shared fixtures for integration testing: a scripted asset fetcher, a
//! page-echoing function registry, and manifest/output builders.
#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::Response;

use edge_router::manifest::{CompiledManifest, RoutingManifest};
use edge_router::output::{BuildOutput, OutputEntry};
use edge_router::serve::{AssetFetcher, FunctionRegistry, ServeError};

/// Asset fetcher backed by an in-memory map, failing on anything absent.
pub struct MockAssets {
    assets: HashMap<String, (String, String)>,
}

impl MockAssets {
    pub fn new(entries: &[(&str, &str, &str)]) -> Self {
        let assets = entries
            .iter()
            .map(|(path, body, content_type)| {
                (path.to_string(), (body.to_string(), content_type.to_string()))
            })
            .collect();
        Self { assets }
    }
}

#[async_trait]
impl AssetFetcher for MockAssets {
    async fn fetch(&self, path: &str) -> Result<Response, ServeError> {
        let (body, content_type) = self.assets.get(path).ok_or_else(|| ServeError::Asset {
            path: path.to_string(),
            reason: "asset not found".to_string(),
        })?;

        let mut response = Response::new(Body::from(body.clone()));
        if let Ok(value) = HeaderValue::from_str(content_type) {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        Ok(response)
    }
}

/// Register a page handler that echoes its entrypoint name and the query
/// parameters it was invoked with.
pub fn register_page(registry: &mut FunctionRegistry, entrypoint: &str) {
    let file = entrypoint.to_string();
    registry.register(entrypoint, move |req, _ctx| {
        let file = file.clone();
        async move {
            let params: Vec<(String, String)> = req
                .uri()
                .query()
                .map(|q| {
                    url::form_urlencoded::parse(q.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default();

            let body = serde_json::json!({ "file": file, "params": params }).to_string();
            let mut response = Response::new(Body::from(body));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            Ok(response)
        }
    });
}

pub fn compile_manifest(value: serde_json::Value) -> CompiledManifest {
    let manifest: RoutingManifest = serde_json::from_value(value).unwrap();
    CompiledManifest::new(manifest).unwrap()
}

pub fn build_output(value: serde_json::Value) -> BuildOutput {
    let entries: HashMap<String, OutputEntry> = serde_json::from_value(value).unwrap();
    BuildOutput::new(entries)
}
