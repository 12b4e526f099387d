//! Manifest loading and pattern compilation.
//!
//! # Responsibilities
//! - Read and parse the routing manifest JSON
//! - Enforce the supported manifest version
//! - Compile every rule pattern and condition pattern up front
//!
//! # Design Decisions
//! - A pattern that fails to compile fails the whole load; the router is
//!   never constructible from an invalid manifest
//! - Condition patterns compile case-sensitively (the platform matches
//!   them with plain, unanchored matching)

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use thiserror::Error;

use crate::manifest::schema::{Condition, OverrideSpec, Phase, RouteRule, RoutingManifest};
use crate::routing::pattern::Pattern;

/// The manifest format version this engine understands.
pub const SUPPORTED_VERSION: u32 = 3;

/// Errors raised while loading or compiling a routing manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported manifest version {0} (expected {SUPPORTED_VERSION})")]
    UnsupportedVersion(u32),

    #[error("invalid pattern '{src}' in {phase} phase: {source}")]
    Pattern {
        phase: &'static str,
        src: String,
        source: regex::Error,
    },

    #[error("invalid condition pattern '{value}': {source}")]
    ConditionPattern { value: String, source: regex::Error },
}

/// A routing rule with its patterns compiled for request-time evaluation.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// The declarative rule as loaded.
    pub rule: RouteRule,

    /// Compiled `src` pattern, honoring the rule's case sensitivity.
    pub src: Pattern,

    /// Compiled `has` conditions (empty when the rule declares none).
    pub has: Vec<CompiledCondition>,

    /// Compiled `missing` conditions (empty when the rule declares none).
    pub missing: Vec<CompiledCondition>,
}

/// A condition paired with its compiled value pattern, when it has one.
///
/// `host` conditions never compile a pattern; they compare by equality.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    pub condition: Condition,
    pub value: Option<Regex>,
}

/// A fully compiled routing manifest, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct CompiledManifest {
    /// Path prefix stripped from incoming requests before routing.
    pub base_path: String,

    /// Literal asset filename → serving metadata, applied to the entry map.
    pub overrides: BTreeMap<String, OverrideSpec>,

    none: Vec<CompiledRule>,
    filesystem: Vec<CompiledRule>,
    rewrite: Vec<CompiledRule>,
    resource: Vec<CompiledRule>,
    miss: Vec<CompiledRule>,
    hit: Vec<CompiledRule>,
    error: Vec<CompiledRule>,
}

impl CompiledManifest {
    /// Compile a parsed manifest, validating every pattern it contains.
    pub fn new(manifest: RoutingManifest) -> Result<Self, ManifestError> {
        if manifest.version != SUPPORTED_VERSION {
            return Err(ManifestError::UnsupportedVersion(manifest.version));
        }

        let routes = manifest.routes;
        Ok(Self {
            base_path: manifest.base_path,
            overrides: manifest.overrides,
            none: compile_phase(routes.none, Phase::None)?,
            filesystem: compile_phase(routes.filesystem, Phase::Filesystem)?,
            rewrite: compile_phase(routes.rewrite, Phase::Rewrite)?,
            resource: compile_phase(routes.resource, Phase::Resource)?,
            miss: compile_phase(routes.miss, Phase::Miss)?,
            hit: compile_phase(routes.hit, Phase::Hit)?,
            error: compile_phase(routes.error, Phase::Error)?,
        })
    }

    /// The compiled rule list for one phase, in evaluation order.
    pub fn phase(&self, phase: Phase) -> &[CompiledRule] {
        match phase {
            Phase::None => &self.none,
            Phase::Filesystem => &self.filesystem,
            Phase::Rewrite => &self.rewrite,
            Phase::Resource => &self.resource,
            Phase::Miss => &self.miss,
            Phase::Hit => &self.hit,
            Phase::Error => &self.error,
        }
    }
}

/// Load and compile a routing manifest from a JSON file.
pub fn load_manifest(path: &Path) -> Result<CompiledManifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    let manifest: RoutingManifest = serde_json::from_str(&content)?;
    CompiledManifest::new(manifest)
}

fn compile_phase(rules: Vec<RouteRule>, phase: Phase) -> Result<Vec<CompiledRule>, ManifestError> {
    rules
        .into_iter()
        .map(|rule| compile_rule(rule, phase))
        .collect()
}

fn compile_rule(rule: RouteRule, phase: Phase) -> Result<CompiledRule, ManifestError> {
    let src = Pattern::compile(&rule.src, rule.case_sensitive).map_err(|source| {
        ManifestError::Pattern {
            phase: phase.as_str(),
            src: rule.src.clone(),
            source,
        }
    })?;

    let has = compile_conditions(rule.has.clone().unwrap_or_default())?;
    let missing = compile_conditions(rule.missing.clone().unwrap_or_default())?;

    Ok(CompiledRule {
        rule,
        src,
        has,
        missing,
    })
}

fn compile_conditions(
    conditions: Vec<Condition>,
) -> Result<Vec<CompiledCondition>, ManifestError> {
    conditions
        .into_iter()
        .map(|condition| {
            let value = match &condition {
                // Host conditions compare by equality, never by pattern.
                Condition::Host { .. } => None,
                _ => condition
                    .value()
                    .map(|pattern| {
                        Regex::new(pattern).map_err(|source| ManifestError::ConditionPattern {
                            value: pattern.to_string(),
                            source,
                        })
                    })
                    .transpose()?,
            };
            Ok(CompiledCondition { condition, value })
        })
        .collect()
}
