//! Routing-manifest schema definitions.
//!
//! This module defines the declarative routing language consumed by the
//! route engine: phased rule lists, per-rule predicates, and the overrides
//! table. All types derive Serde traits for deserialization from the build
//! output's JSON manifest.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Root of the routing manifest produced by the upstream build.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingManifest {
    /// Manifest format version. Only version 3 is supported.
    pub version: u32,

    /// Rule lists keyed by phase name.
    #[serde(default)]
    pub routes: PhaseRules,

    /// Literal asset filename → serving metadata (path alias, content type).
    #[serde(default)]
    pub overrides: BTreeMap<String, OverrideSpec>,

    /// Path prefix stripped from incoming requests before routing.
    #[serde(default, rename = "basePath")]
    pub base_path: String,
}

/// The ordered rule lists of the routing pipeline, one per phase.
///
/// Phases absent from the manifest evaluate as empty lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhaseRules {
    pub none: Vec<RouteRule>,
    pub filesystem: Vec<RouteRule>,
    pub rewrite: Vec<RouteRule>,
    pub resource: Vec<RouteRule>,
    pub miss: Vec<RouteRule>,
    pub hit: Vec<RouteRule>,
    pub error: Vec<RouteRule>,
}

/// Identifier for one routing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    None,
    Filesystem,
    Rewrite,
    Resource,
    Miss,
    Hit,
    Error,
}

impl Phase {
    /// Phases tried in order while no build-output entry has resolved,
    /// after `none` has run.
    pub const FALLBACK_ORDER: [Phase; 4] =
        [Phase::Filesystem, Phase::Rewrite, Phase::Resource, Phase::Miss];

    /// Phase name as it appears in the manifest.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::None => "none",
            Phase::Filesystem => "filesystem",
            Phase::Rewrite => "rewrite",
            Phase::Resource => "resource",
            Phase::Miss => "miss",
            Phase::Hit => "hit",
            Phase::Error => "error",
        }
    }
}

/// One routing directive: a path pattern plus optional predicates and
/// rewrite/header/status effects.
///
/// Rule order within a phase is evaluation order. A matched rule stops the
/// phase unless `continue` is set; an `override` match discards response
/// state accumulated by earlier rules before applying its own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteRule {
    /// Path pattern (extended regular expression, optionally anchored).
    pub src: String,

    /// Destination template. Absent means the working path is unchanged.
    #[serde(default)]
    pub dest: Option<String>,

    /// Response status to accumulate on match.
    #[serde(default)]
    pub status: Option<u16>,

    /// Response header templates to accumulate on match.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,

    /// HTTP methods this rule applies to. Absent means all methods.
    #[serde(default)]
    pub methods: Option<Vec<String>>,

    /// Conditions that must all hold for the rule to apply.
    #[serde(default)]
    pub has: Option<Vec<Condition>>,

    /// Conditions that must all fail for the rule to apply.
    #[serde(default)]
    pub missing: Option<Vec<Condition>>,

    /// Keep evaluating later rules in this phase after a match.
    #[serde(default)]
    pub r#continue: bool,

    /// Discard previously accumulated status/headers before applying.
    #[serde(default)]
    pub r#override: bool,

    /// Match the pattern case-sensitively. Defaults to insensitive.
    #[serde(default, rename = "caseSensitive")]
    pub case_sensitive: bool,

    /// Entrypoint handle of a middleware function to invoke instead of
    /// serving an entry directly.
    #[serde(default, rename = "middlewarePath")]
    pub middleware_path: Option<String>,
}

/// Auxiliary match condition for `has`/`missing` lists.
///
/// An absent `value` is a presence-only check; a present `value` is a
/// pattern the header/cookie/query value must match (exact equality for
/// `host`).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Condition {
    Host {
        #[serde(default)]
        value: Option<String>,
    },
    Header {
        key: String,
        #[serde(default)]
        value: Option<String>,
    },
    Cookie {
        key: String,
        #[serde(default)]
        value: Option<String>,
    },
    Query {
        key: String,
        #[serde(default)]
        value: Option<String>,
    },
}

impl Condition {
    /// The value pattern carried by this condition, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Condition::Host { value }
            | Condition::Header { value, .. }
            | Condition::Cookie { value, .. }
            | Condition::Query { value, .. } => value.as_deref(),
        }
    }
}

/// Serving metadata for one overridden asset: the route path it answers
/// and the content type it is served with.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideSpec {
    pub path: String,

    #[serde(rename = "contentType")]
    pub content_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_deserializes_platform_field_names() {
        let rule: RouteRule = serde_json::from_str(
            r#"{
                "src": "^/index(?:/)?",
                "dest": "/",
                "continue": true,
                "override": true,
                "caseSensitive": true,
                "has": [{ "type": "header", "key": "x-nextjs-data" }]
            }"#,
        )
        .unwrap();

        assert_eq!(rule.src, "^/index(?:/)?");
        assert_eq!(rule.dest.as_deref(), Some("/"));
        assert!(rule.r#continue);
        assert!(rule.r#override);
        assert!(rule.case_sensitive);
        assert_eq!(rule.has.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_rule_defaults() {
        let rule: RouteRule = serde_json::from_str(r#"{ "src": "/.*" }"#).unwrap();
        assert!(!rule.r#continue);
        assert!(!rule.r#override);
        assert!(!rule.case_sensitive);
        assert!(rule.dest.is_none());
        assert!(rule.methods.is_none());
    }

    #[test]
    fn test_unknown_rule_fields_are_ignored() {
        let rule: RouteRule =
            serde_json::from_str(r#"{ "src": "/.*", "check": true, "important": true }"#).unwrap();
        assert_eq!(rule.src, "/.*");
    }

    #[test]
    fn test_unknown_condition_type_is_rejected() {
        let result: Result<Condition, _> =
            serde_json::from_str(r#"{ "type": "region", "key": "x" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_manifest_phases_default_to_empty() {
        let manifest: RoutingManifest =
            serde_json::from_str(r#"{ "version": 3, "routes": { "none": [] } }"#).unwrap();
        assert!(manifest.routes.filesystem.is_empty());
        assert!(manifest.routes.error.is_empty());
        assert!(manifest.base_path.is_empty());
    }
}
