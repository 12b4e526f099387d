//! In-process function registry.
//!
//! # Responsibilities
//! - Map entrypoint handles to host-registered async handlers
//! - Invoke the handler for a resolved function/middleware entry
//!
//! # Design Decisions
//! - Handlers are plain async closures; the registry is frozen before the
//!   router is built and shared via Arc
//! - An unregistered entrypoint is a dispatch failure, not a 404

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::serve::{FunctionInvoker, InvocationContext, ServeError};

type Handler = Arc<
    dyn Fn(Request<Body>, InvocationContext) -> BoxFuture<'static, Result<Response, ServeError>>
        + Send
        + Sync,
>;

/// Registry of function entrypoints the host has provided.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    handlers: HashMap<String, Handler>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async handler under an entrypoint handle.
    pub fn register<F, Fut>(&mut self, entrypoint: impl Into<String>, handler: F)
    where
        F: Fn(Request<Body>, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, ServeError>> + Send + 'static,
    {
        self.handlers.insert(
            entrypoint.into(),
            Arc::new(move |req, ctx| Box::pin(handler(req, ctx))),
        );
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[async_trait]
impl FunctionInvoker for FunctionRegistry {
    async fn invoke(
        &self,
        entrypoint: &str,
        req: Request<Body>,
        ctx: &InvocationContext,
    ) -> Result<Response, ServeError> {
        let handler = self
            .handlers
            .get(entrypoint)
            .ok_or_else(|| ServeError::MissingEntrypoint(entrypoint.to_string()))?;
        handler(req, ctx.clone()).await
    }
}
