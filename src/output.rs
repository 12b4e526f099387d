//! Build-output entry map.
//!
//! # Responsibilities
//! - Model the servable units produced by the upstream build
//! - Normalize route keys (leading slash, no trailing slash except root)
//! - Apply the manifest's overrides table onto the map at load time
//!
//! # Design Decisions
//! - Entries are a tagged sum type; dispatch over them is exhaustive
//! - The map is immutable during serving, shared via Arc
//! - Lookups ignore any query suffix the working path carries

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::manifest::schema::OverrideSpec;

/// Errors raised while loading the entry map.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to read build output map: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse build output map: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One servable unit: a static asset, a content-type-overridden asset, or
/// an invokable function/middleware entrypoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputEntry {
    Static,
    Override {
        path: String,
        #[serde(rename = "contentType")]
        content_type: String,
    },
    Function {
        entrypoint: String,
        #[serde(default)]
        matchers: Vec<EntryMatcher>,
    },
    Middleware {
        entrypoint: String,
        #[serde(default)]
        matchers: Vec<EntryMatcher>,
    },
}

/// Platform matcher metadata attached to function entries. Retained as
/// data; route selection is the manifest's job, not the matchers'.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryMatcher {
    pub regexp: String,
}

/// The canonical-path → entry map, built once per build.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    entries: HashMap<String, OutputEntry>,
}

impl BuildOutput {
    pub fn new(entries: HashMap<String, OutputEntry>) -> Self {
        Self { entries }
    }

    /// Load the entry map from a JSON file.
    pub fn load(path: &Path) -> Result<Self, OutputError> {
        let content = fs::read_to_string(path)?;
        let entries: HashMap<String, OutputEntry> = serde_json::from_str(&content)?;
        Ok(Self { entries })
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: OutputEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Exact-key access, used for middleware handles which are stored
    /// under their bare name rather than a route path.
    pub fn get(&self, key: &str) -> Option<&OutputEntry> {
        self.entries.get(key)
    }

    /// Resolve a working path to an entry, normalizing the key first.
    pub fn lookup(&self, path: &str) -> Option<&OutputEntry> {
        self.entries.get(&canonical_key(path))
    }

    /// Fold the manifest's overrides table into the map.
    ///
    /// Each overridden asset becomes servable both at its mapped route
    /// (`/404`) and at its literal filename (`/404.html`), with the
    /// declared content type forced on both.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, OverrideSpec>) {
        for (filename, spec) in overrides {
            let asset_path = ensure_leading_slash(filename);
            let route_path = ensure_leading_slash(&spec.path);
            let entry = OutputEntry::Override {
                path: asset_path.clone(),
                content_type: spec.content_type.clone(),
            };
            self.entries.insert(canonical_key(&route_path), entry.clone());
            self.entries.insert(canonical_key(&asset_path), entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry requires a function invoker to serve.
    pub fn has_functions(&self) -> bool {
        self.entries
            .values()
            .any(|e| matches!(e, OutputEntry::Function { .. } | OutputEntry::Middleware { .. }))
    }
}

/// Normalize a working path into the canonical entry-map key: leading
/// slash, no trailing slash except root, query suffix dropped.
pub fn canonical_key(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let mut key = ensure_leading_slash(path);
    while key.len() > 1 && key.ends_with('/') {
        key.pop();
    }
    key
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_normalization() {
        assert_eq!(canonical_key("/index"), "/index");
        assert_eq!(canonical_key("index"), "/index");
        assert_eq!(canonical_key("/index/"), "/index");
        assert_eq!(canonical_key("/"), "/");
        assert_eq!(canonical_key(""), "/");
        assert_eq!(canonical_key("/page?slug=a"), "/page");
        assert_eq!(canonical_key("/nested/path//"), "/nested/path");
    }

    #[test]
    fn test_lookup_ignores_query_suffix() {
        let mut output = BuildOutput::default();
        output.insert(
            "/category",
            OutputEntry::Function {
                entrypoint: "category".into(),
                matchers: Vec::new(),
            },
        );
        assert!(output.lookup("/category?slug=shoes").is_some());
        assert!(output.lookup("/category/").is_some());
        assert!(output.lookup("/other").is_none());
    }

    #[test]
    fn test_apply_overrides_maps_route_and_filename() {
        let mut output = BuildOutput::default();
        output.insert("/404.html", OutputEntry::Static);

        let mut overrides = BTreeMap::new();
        overrides.insert(
            "404.html".to_string(),
            OverrideSpec {
                path: "404".into(),
                content_type: "text/html; charset=utf-8".into(),
            },
        );
        output.apply_overrides(&overrides);

        for key in ["/404", "/404.html"] {
            match output.get(key) {
                Some(OutputEntry::Override { path, content_type }) => {
                    assert_eq!(path, "/404.html");
                    assert_eq!(content_type, "text/html; charset=utf-8");
                }
                other => panic!("expected override at {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_entry_map_deserializes_tagged_entries() {
        let output: HashMap<String, OutputEntry> = serde_json::from_str(
            r#"{
                "/grid.svg": { "type": "static" },
                "/404": { "type": "override", "path": "/404.html", "contentType": "text/html" },
                "/index": { "type": "function", "entrypoint": "index", "matchers": [{ "regexp": "^/$" }] },
                "middleware": { "type": "middleware", "entrypoint": "middleware" }
            }"#,
        )
        .unwrap();

        assert!(matches!(output["/grid.svg"], OutputEntry::Static));
        assert!(matches!(output["/404"], OutputEntry::Override { .. }));
        assert!(matches!(output["/index"], OutputEntry::Function { .. }));
        assert!(matches!(output["middleware"], OutputEntry::Middleware { .. }));
    }
}
