//! Phase evaluation.
//!
//! # Responsibilities
//! - Iterate one phase's rule list in order
//! - Accumulate response status/headers, honoring `override`
//! - Rewrite the working path through `dest` templates
//! - Stop at the first match unless the rule says `continue`
//!
//! # Design Decisions
//! - The evaluation state is threaded through every phase of one request;
//!   `override` therefore discards accumulation from earlier phases too
//! - Header keys fold to lowercase in the HeaderMap; last write wins
//! - An unrepresentable header value or status is dropped, not an error
//!   (best-effort rewrite)

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::manifest::load::CompiledRule;
use crate::routing::matcher::{check_rule, RequestContext};
use crate::routing::substitute::substitute;

/// Mutable per-request evaluation state, owned by one in-flight request.
#[derive(Debug, Clone)]
pub struct EvaluationState {
    /// The working path; `dest` rewrites replace it. May carry a query
    /// suffix introduced by a destination template.
    pub path: String,

    /// Accumulated response status, if any rule set one.
    pub status: Option<StatusCode>,

    /// Accumulated response headers, applied as a final overlay.
    pub headers: HeaderMap,
}

impl EvaluationState {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: None,
            headers: HeaderMap::new(),
        }
    }
}

/// What one phase's evaluation produced, beyond the state mutations.
#[derive(Debug, Clone, Default)]
pub struct PhaseOutcome {
    /// Whether any rule in the phase matched.
    pub matched: bool,

    /// Entrypoint handle of a matched rule's middleware, if one matched.
    pub middleware: Option<String>,
}

/// Evaluate one phase's rules against the working path.
///
/// Rules are tried in list order. A matching rule applies its effects to
/// `state` and stops the phase unless it sets `continue`. When
/// `required_status` is given (error-phase dispatch), only rules tagged
/// with exactly that status can match.
pub fn evaluate_phase(
    rules: &[CompiledRule],
    state: &mut EvaluationState,
    ctx: &RequestContext,
    required_status: Option<u16>,
) -> PhaseOutcome {
    let mut outcome = PhaseOutcome::default();

    for compiled in rules {
        let Some(captures) = check_rule(compiled, &state.path, ctx, required_status) else {
            continue;
        };
        outcome.matched = true;

        let rule = &compiled.rule;
        if rule.r#override {
            state.status = None;
            state.headers.clear();
        }

        if let Some(headers) = &rule.headers {
            for (key, template) in headers {
                let value = substitute(template, &captures);
                match (
                    HeaderName::try_from(key.as_str()),
                    HeaderValue::from_str(&value),
                ) {
                    (Ok(name), Ok(value)) => {
                        state.headers.insert(name, value);
                    }
                    _ => {
                        tracing::warn!(header = %key, "Dropping unrepresentable header value");
                    }
                }
            }
        }

        if let Some(status) = rule.status {
            if let Ok(status) = StatusCode::from_u16(status) {
                state.status = Some(status);
            }
        }

        if let Some(dest) = &rule.dest {
            state.path = substitute(dest, &captures);
        }

        if rule.middleware_path.is_some() {
            outcome.middleware = rule.middleware_path.clone();
        }

        if !rule.r#continue {
            break;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::load::{CompiledManifest, CompiledRule};
    use crate::manifest::schema::{Phase, RoutingManifest};
    use axum::body::Body;
    use axum::http::Request;

    fn rules(json: serde_json::Value) -> Vec<CompiledRule> {
        let manifest: RoutingManifest =
            serde_json::from_value(serde_json::json!({ "version": 3, "routes": { "none": json } }))
                .unwrap();
        CompiledManifest::new(manifest)
            .unwrap()
            .phase(Phase::None)
            .to_vec()
    }

    fn context(method: &str, uri: &str) -> RequestContext {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "test.com")
            .body(Body::empty())
            .unwrap();
        let (parts, _) = request.into_parts();
        RequestContext::from_parts(&parts)
    }

    #[test]
    fn test_redirect_rule_sets_status_and_header() {
        let rules = rules(serde_json::json!([
            { "src": "^/about(?:/)?$", "headers": { "Location": "/" }, "status": 308 }
        ]));
        let ctx = context("GET", "/about");
        let mut state = EvaluationState::new("/about");

        let outcome = evaluate_phase(&rules, &mut state, &ctx, None);

        assert!(outcome.matched);
        assert_eq!(state.status, Some(StatusCode::PERMANENT_REDIRECT));
        assert_eq!(
            state.headers.get("location").and_then(|v| v.to_str().ok()),
            Some("/")
        );
        assert_eq!(state.path, "/about");
    }

    #[test]
    fn test_non_continue_match_halts_the_phase() {
        // The sentinel after the terminal rule must be provably skipped.
        let rules = rules(serde_json::json!([
            { "src": "^/page$", "status": 308 },
            { "src": "^/page$", "headers": { "x-sentinel": "reached" }, "continue": true }
        ]));
        let ctx = context("GET", "/page");
        let mut state = EvaluationState::new("/page");

        evaluate_phase(&rules, &mut state, &ctx, None);

        assert_eq!(state.status, Some(StatusCode::PERMANENT_REDIRECT));
        assert!(!state.headers.contains_key("x-sentinel"));
    }

    #[test]
    fn test_override_discards_earlier_accumulation() {
        let rules = rules(serde_json::json!([
            { "src": "/.*", "status": 308, "headers": { "x-early": "1" }, "continue": true },
            { "src": "/.*", "override": true, "headers": { "x-late": "2" }, "continue": true }
        ]));
        let ctx = context("GET", "/anything");
        let mut state = EvaluationState::new("/anything");

        evaluate_phase(&rules, &mut state, &ctx, None);

        assert_eq!(state.status, None);
        assert!(!state.headers.contains_key("x-early"));
        assert_eq!(
            state.headers.get("x-late").and_then(|v| v.to_str().ok()),
            Some("2")
        );
    }

    #[test]
    fn test_continue_rules_rewrite_the_working_path_in_sequence() {
        let rules = rules(serde_json::json!([
            { "src": "^/a$", "dest": "/b", "continue": true },
            { "src": "^/b$", "dest": "/c", "continue": true }
        ]));
        let ctx = context("GET", "/a");
        let mut state = EvaluationState::new("/a");

        evaluate_phase(&rules, &mut state, &ctx, None);

        assert_eq!(state.path, "/c");
    }

    #[test]
    fn test_method_scoped_rule_skips_other_methods() {
        let rules = rules(serde_json::json!([
            { "src": "^/submit$", "methods": ["POST"], "status": 303 }
        ]));
        let mut state = EvaluationState::new("/submit");

        let get = evaluate_phase(&rules, &mut state, &context("GET", "/submit"), None);
        assert!(!get.matched);
        assert_eq!(state.status, None);

        let post = evaluate_phase(&rules, &mut state, &context("POST", "/submit"), None);
        assert!(post.matched);
        assert_eq!(state.status, Some(StatusCode::SEE_OTHER));
    }

    #[test]
    fn test_required_status_filters_rules() {
        let rules = rules(serde_json::json!([
            { "src": "/.*", "dest": "/404", "status": 404 },
            { "src": "/.*", "dest": "/500", "status": 500 }
        ]));
        let ctx = context("GET", "/broken");

        let mut state = EvaluationState::new("/broken");
        evaluate_phase(&rules, &mut state, &ctx, Some(500));
        assert_eq!(state.path, "/500");

        let mut state = EvaluationState::new("/broken");
        evaluate_phase(&rules, &mut state, &ctx, Some(404));
        assert_eq!(state.path, "/404");
    }

    #[test]
    fn test_header_templates_substitute_captures() {
        let rules = rules(serde_json::json!([
            { "src": "^(?:/((?:[^/]+?)(?:/(?:[^/]+?))*))/$", "headers": { "Location": "/$1" }, "status": 308 }
        ]));
        let ctx = context("GET", "/nested/path/");
        let mut state = EvaluationState::new("/nested/path/");

        evaluate_phase(&rules, &mut state, &ctx, None);

        assert_eq!(
            state.headers.get("location").and_then(|v| v.to_str().ok()),
            Some("/nested/path")
        );
    }

    #[test]
    fn test_middleware_rule_is_reported() {
        let rules = rules(serde_json::json!([
            { "src": "^/guarded(?:/.*)?$", "middlewarePath": "middleware", "continue": true, "override": true }
        ]));
        let ctx = context("GET", "/guarded/area");
        let mut state = EvaluationState::new("/guarded/area");

        let outcome = evaluate_phase(&rules, &mut state, &ctx, None);

        assert_eq!(outcome.middleware.as_deref(), Some("middleware"));
    }
}
