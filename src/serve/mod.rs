//! Serving collaborators.
//!
//! # Data Flow
//! ```text
//! Router resolves an entry
//!     → static/override → AssetFetcher (assets.rs: disk-backed impl)
//!     → function/middleware → FunctionInvoker (functions.rs: registry impl)
//!     → Response returned to the router for the final overlay
//! ```
//!
//! # Design Decisions
//! - Both capabilities are async trait objects supplied by the host;
//!   the engine never fetches or executes anything itself
//! - A failed fetch or invocation propagates as a request-level error,
//!   never downgraded to a routing miss

pub mod assets;
pub mod functions;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use thiserror::Error;

pub use assets::DiskAssets;
pub use functions::FunctionRegistry;

/// Errors raised while serving a resolved entry.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The asset-fetch collaborator could not produce the asset.
    #[error("asset fetch failed for '{path}': {reason}")]
    Asset { path: String, reason: String },

    /// A function entrypoint was invoked and failed.
    #[error("function '{entrypoint}' failed: {reason}")]
    Function { entrypoint: String, reason: String },

    /// A rule or entry referenced an entrypoint nothing provides.
    #[error("no handler registered for entrypoint '{0}'")]
    MissingEntrypoint(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Per-invocation execution context handed to function entrypoints.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// Correlation ID of the request being served.
    pub request_id: String,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

/// Async capability for fetching static and overridden assets.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Response, ServeError>;
}

/// Async capability for invoking function and middleware entrypoints.
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(
        &self,
        entrypoint: &str,
        req: Request<Body>,
        ctx: &InvocationContext,
    ) -> Result<Response, ServeError>;
}
