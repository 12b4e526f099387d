//! Rule predicate evaluation.
//!
//! # Responsibilities
//! - Build the per-request context (url, headers, cookies) once per request
//! - Evaluate `has`/`missing` conditions against that context
//! - Combine the rule filters: methods, pattern, predicates, requiredStatus
//!
//! # Design Decisions
//! - Cookies are parsed once per request, not per condition
//! - An absent condition `value` is a presence-only check; an empty header,
//!   cookie or query value still counts as present
//! - A `host` condition without a value is ill-formed and never matches

use std::collections::HashMap;

use axum::http::request::Parts;
use axum::http::{header, HeaderMap, Method};
use url::Url;

use crate::manifest::load::{CompiledCondition, CompiledRule};
use crate::manifest::schema::Condition;
use crate::routing::pattern::MatchOutcome;

/// Routing-relevant request data, extracted once per request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub cookies: HashMap<String, String>,
}

impl RequestContext {
    /// Extract the context from decomposed request parts.
    pub fn from_parts(parts: &Parts) -> Self {
        let url = request_url(parts);
        let cookies = parse_cookies(&parts.headers);
        Self {
            method: parts.method.clone(),
            url,
            headers: parts.headers.clone(),
            cookies,
        }
    }

    /// First value of a query parameter, if the key is present.
    pub fn query_first(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Whether a query parameter key is present at all.
    pub fn query_has(&self, key: &str) -> bool {
        self.url.query_pairs().any(|(k, _)| k == key)
    }
}

/// Reconstruct an absolute URL for the request.
///
/// Origin-form request targets carry no scheme or host; those come from
/// the Host header (and x-forwarded-proto when the edge terminates TLS).
fn request_url(parts: &Parts) -> Url {
    let scheme = parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Url::parse(&format!("{scheme}://{host}{path_and_query}"))
        .ok()
        .or_else(|| Url::parse(&format!("http://localhost{path_and_query}")).ok())
        .unwrap_or_else(|| Url::parse("http://localhost/").expect("literal URL"))
}

/// Parse the `Cookie` header into name/value pairs.
///
/// A cookie with an empty value ("bar=") is present with the empty string.
pub fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|raw| {
            raw.split(';')
                .filter_map(|pair| {
                    let mut parts = pair.trim().splitn(2, '=');
                    let name = parts.next()?.trim();
                    if name.is_empty() {
                        return None;
                    }
                    let value = parts.next().unwrap_or("").trim();
                    Some((name.to_string(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Evaluate one auxiliary condition against the request context.
pub fn has_field(condition: &CompiledCondition, ctx: &RequestContext) -> bool {
    match &condition.condition {
        Condition::Host { value } => match value {
            Some(host) => ctx.url.host_str() == Some(host.as_str()),
            None => false,
        },
        Condition::Header { key, .. } => match &condition.value {
            Some(pattern) => ctx
                .headers
                .get(key.as_str())
                .and_then(|v| v.to_str().ok())
                .map(|v| pattern.is_match(v))
                .unwrap_or(false),
            None => ctx.headers.contains_key(key.as_str()),
        },
        Condition::Cookie { key, .. } => match &condition.value {
            Some(pattern) => ctx
                .cookies
                .get(key)
                .map(|v| pattern.is_match(v))
                .unwrap_or(false),
            None => ctx.cookies.contains_key(key),
        },
        Condition::Query { key, .. } => match &condition.value {
            Some(pattern) => ctx
                .query_first(key)
                .map(|v| pattern.is_match(&v))
                .unwrap_or(false),
            None => ctx.query_has(key),
        },
    }
}

/// Run all of a rule's filters against the working path and context.
///
/// Returns the pattern captures when every filter passes, `None` when the
/// rule does not apply. `required_status` is used by error-phase dispatch
/// to select a rule tagged for a specific status.
pub fn check_rule(
    compiled: &CompiledRule,
    current_path: &str,
    ctx: &RequestContext,
    required_status: Option<u16>,
) -> Option<MatchOutcome> {
    let rule = &compiled.rule;

    if let Some(methods) = &rule.methods {
        if !methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(ctx.method.as_str()))
        {
            return None;
        }
    }

    let outcome = compiled.src.matches(current_path);
    if !outcome.matched {
        return None;
    }

    if !compiled.has.iter().all(|c| has_field(c, ctx)) {
        return None;
    }
    if compiled.missing.iter().any(|c| has_field(c, ctx)) {
        return None;
    }

    if let Some(required) = required_status {
        if rule.status != Some(required) {
            return None;
        }
    }

    Some(outcome)
}
