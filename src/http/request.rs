//! Request identification.
//!
//! # Responsibilities
//! - Ensure every request carries an `x-request-id` header (UUID v4)
//!   before anything else sees it
//!
//! # Design Decisions
//! - An ID supplied by the client (or an upstream edge hop) is preserved
//! - The ID flows into logs, the invocation context and the response

use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that injects a request ID as early as possible.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service wrapper produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        if !req.headers().contains_key(X_REQUEST_ID) {
            let id = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                req.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::convert::Infallible;
    use std::future::{ready, Ready};

    #[derive(Clone)]
    struct Capture;

    impl Service<Request<Body>> for Capture {
        type Response = Option<String>;
        type Error = Infallible;
        type Future = Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(
            &mut self,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<Result<(), Self::Error>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Body>) -> Self::Future {
            ready(Ok(req
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(String::from)))
        }
    }

    #[tokio::test]
    async fn test_generates_id_when_absent() {
        let mut service = RequestIdLayer.layer(Capture);
        let req = Request::builder().body(Body::empty()).unwrap();
        let id = service.call(req).await.unwrap();
        assert!(id.is_some());
        assert_eq!(id.unwrap().len(), 36);
    }

    #[tokio::test]
    async fn test_preserves_existing_id() {
        let mut service = RequestIdLayer.layer(Capture);
        let req = Request::builder()
            .header(X_REQUEST_ID, "edge-hop-1")
            .body(Body::empty())
            .unwrap();
        let id = service.call(req).await.unwrap();
        assert_eq!(id.as_deref(), Some("edge-hop-1"));
    }
}
