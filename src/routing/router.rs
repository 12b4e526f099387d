//! Request dispatch.
//!
//! # Responsibilities
//! - Drive the multi-phase evaluation for one request
//! - Resolve the final build-output entry
//! - Dispatch to the serving collaborators (asset fetch, function invoke)
//! - Apply the accumulated headers/status as a final overlay
//!
//! # Design Decisions
//! - `none` always runs; `filesystem`, `rewrite`, `resource` and `miss`
//!   run only while no entry has resolved; `hit` decorates headers once
//!   one has; `error` is the final fallback, filtered by required status
//! - Routing-table misses never error: the worst case is a synthetic
//!   Not Found, still subject to the overlay (which is how header-only
//!   redirect rules work without any entry)
//! - Dispatch failures propagate; a broken entrypoint is not a 404

use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{Request, StatusCode, Uri};
use axum::response::Response;

use crate::http::request::X_REQUEST_ID;
use crate::http::response::{apply_headers, apply_status};
use crate::manifest::load::CompiledManifest;
use crate::manifest::schema::Phase;
use crate::output::{BuildOutput, OutputEntry};
use crate::routing::engine::{evaluate_phase, EvaluationState};
use crate::routing::matcher::RequestContext;
use crate::serve::{AssetFetcher, FunctionInvoker, InvocationContext, ServeError};

/// The routing engine's entry point: one of these serves every request,
/// sharing the immutable manifest and entry map across all of them.
#[derive(Clone)]
pub struct EdgeRouter {
    manifest: Arc<CompiledManifest>,
    output: Arc<BuildOutput>,
    assets: Arc<dyn AssetFetcher>,
    functions: Arc<dyn FunctionInvoker>,
}

impl EdgeRouter {
    pub fn new(
        manifest: Arc<CompiledManifest>,
        output: Arc<BuildOutput>,
        assets: Arc<dyn AssetFetcher>,
        functions: Arc<dyn FunctionInvoker>,
    ) -> Self {
        Self {
            manifest,
            output,
            assets,
            functions,
        }
    }

    /// Evaluate the routing manifest for one request and serve the result.
    ///
    /// Never fails for a miss; `Err` means a resolved entry could not be
    /// served (asset fetch or function invocation failed).
    pub async fn match_request(&self, req: Request<Body>) -> Result<Response, ServeError> {
        let (parts, body) = req.into_parts();
        let ctx = RequestContext::from_parts(&parts);

        let path = strip_base_path(ctx.url.path(), &self.manifest.base_path);
        let mut state = EvaluationState::new(path);

        let outcome = evaluate_phase(self.manifest.phase(Phase::None), &mut state, &ctx, None);
        if let Some(middleware) = outcome.middleware {
            return self.dispatch_middleware(&middleware, parts, body, &state).await;
        }

        let mut entry = self.output.lookup(&state.path).cloned();

        for phase in Phase::FALLBACK_ORDER {
            if entry.is_some() {
                break;
            }
            let outcome = evaluate_phase(self.manifest.phase(phase), &mut state, &ctx, None);
            if let Some(middleware) = outcome.middleware {
                return self.dispatch_middleware(&middleware, parts, body, &state).await;
            }
            entry = self.output.lookup(&state.path).cloned();
            tracing::trace!(phase = phase.as_str(), path = %state.path, resolved = entry.is_some());
        }

        if entry.is_none() {
            if state.status.is_none() {
                state.status = Some(StatusCode::NOT_FOUND);
            }
            let required = state.status.map(|s| s.as_u16());
            let outcome =
                evaluate_phase(self.manifest.phase(Phase::Error), &mut state, &ctx, required);
            if outcome.matched {
                entry = self.output.lookup(&state.path).cloned();
            }
        }

        // The hit phase only decorates headers; the entry and the path it
        // resolved at are already fixed.
        let serve_path = state.path.clone();
        if entry.is_some() {
            evaluate_phase(self.manifest.phase(Phase::Hit), &mut state, &ctx, None);
        }

        let response = match &entry {
            Some(entry) => self.serve_item(entry, parts, body, &serve_path).await?,
            None => {
                tracing::debug!(path = %serve_path, "No entry resolved; serving synthetic fallback");
                synthetic_not_found()
            }
        };

        Ok(finalize(response, &state))
    }

    /// Serve one resolved entry with the matching strategy.
    async fn serve_item(
        &self,
        entry: &OutputEntry,
        parts: Parts,
        body: Body,
        serve_path: &str,
    ) -> Result<Response, ServeError> {
        match entry {
            OutputEntry::Static => self.assets.fetch(route_path(serve_path)).await,
            OutputEntry::Override { path, content_type } => {
                let mut response = self.assets.fetch(path).await?;
                if let Ok(value) = content_type.parse() {
                    response
                        .headers_mut()
                        .insert(axum::http::header::CONTENT_TYPE, value);
                }
                Ok(response)
            }
            OutputEntry::Function { entrypoint, .. }
            | OutputEntry::Middleware { entrypoint, .. } => {
                let ctx = invocation_context(&parts);
                let req = function_request(parts, body, serve_path);
                self.functions.invoke(entrypoint, req, &ctx).await
            }
        }
    }

    /// Invoke a middleware entrypoint named by a matched rule, bypassing
    /// entry-by-path resolution.
    async fn dispatch_middleware(
        &self,
        name: &str,
        parts: Parts,
        body: Body,
        state: &EvaluationState,
    ) -> Result<Response, ServeError> {
        let entrypoint = match self.output.get(name) {
            Some(OutputEntry::Middleware { entrypoint, .. })
            | Some(OutputEntry::Function { entrypoint, .. }) => entrypoint.clone(),
            _ => return Err(ServeError::MissingEntrypoint(name.to_string())),
        };

        let ctx = invocation_context(&parts);
        let req = function_request(parts, body, &state.path);
        let response = self.functions.invoke(&entrypoint, req, &ctx).await?;
        Ok(finalize(response, state))
    }
}

/// Apply the accumulated overlay: headers are set (not merged), the
/// status replaces whatever the dispatch step returned.
fn finalize(mut response: Response, state: &EvaluationState) -> Response {
    apply_headers(&mut response, &state.headers);
    if let Some(status) = state.status {
        apply_status(&mut response, status);
    }
    response
}

fn synthetic_not_found() -> Response {
    let mut response = Response::new(Body::from("Not Found"));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

/// The route-path part of a working path, without any query suffix a
/// destination template introduced.
fn route_path(working_path: &str) -> &str {
    working_path
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(working_path)
}

fn invocation_context(parts: &Parts) -> InvocationContext {
    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    InvocationContext::new(request_id)
}

/// Rebuild the request for a function invocation: the URI becomes the
/// resolved path, with destination query parameters appended after the
/// original request's.
fn function_request(mut parts: Parts, body: Body, working_path: &str) -> Request<Body> {
    let (path, dest_query) = match working_path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (working_path, None),
    };

    let merged = match (parts.uri.query(), dest_query) {
        (Some(original), Some(dest)) => Some(format!("{original}&{dest}")),
        (Some(original), None) => Some(original.to_string()),
        (None, Some(dest)) => Some(dest.to_string()),
        (None, None) => None,
    };
    let target = match merged {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    match target.parse::<Uri>() {
        Ok(uri) => parts.uri = uri,
        Err(_) => {
            tracing::warn!(target = %target, "Resolved path is not a valid URI; keeping original");
        }
    }
    Request::from_parts(parts, body)
}

/// Strip the manifest's base path from an incoming request path.
fn strip_base_path<'a>(path: &'a str, base_path: &str) -> &'a str {
    if base_path.is_empty() || base_path == "/" {
        return path;
    }
    match path.strip_prefix(base_path) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_base_path() {
        assert_eq!(strip_base_path("/docs/intro", "/docs"), "/intro");
        assert_eq!(strip_base_path("/docs", "/docs"), "/");
        assert_eq!(strip_base_path("/docsy/intro", "/docs"), "/docsy/intro");
        assert_eq!(strip_base_path("/intro", ""), "/intro");
    }

    #[test]
    fn test_route_path_drops_query_suffix() {
        assert_eq!(route_path("/category?slug=shoes"), "/category");
        assert_eq!(route_path("/plain"), "/plain");
    }

    #[test]
    fn test_function_request_merges_queries() {
        let req = Request::builder()
            .uri("/original?a=1")
            .body(Body::empty())
            .unwrap();
        let (parts, body) = req.into_parts();

        let rebuilt = function_request(parts, body, "/resolved?slug=shoes");
        assert_eq!(rebuilt.uri().path(), "/resolved");
        assert_eq!(rebuilt.uri().query(), Some("a=1&slug=shoes"));
    }

    #[test]
    fn test_function_request_without_queries() {
        let req = Request::builder().uri("/original").body(Body::empty()).unwrap();
        let (parts, body) = req.into_parts();

        let rebuilt = function_request(parts, body, "/resolved");
        assert_eq!(rebuilt.uri().path(), "/resolved");
        assert_eq!(rebuilt.uri().query(), None);
    }
}
