//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all serving handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run the server with graceful shutdown
//! - Hand every request to the routing engine and record metrics
//!
//! # Design Decisions
//! - One catch-all route: the routing manifest, not Axum, decides what a
//!   path means
//! - Dispatch failures surface as 500s here; the engine never maps them
//!   to 404

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::AdapterConfig;
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing::router::EdgeRouter;

/// Application state injected into the serving handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<EdgeRouter>,
}

/// HTTP server fronting the routing engine.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server for the given engine.
    pub fn new(config: &AdapterConfig, router: Arc<EdgeRouter>) -> Self {
        let state = AppState { router };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AdapterConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(serve_handler))
            .route("/", any(serve_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Serving handler: every request goes through the routing engine.
async fn serve_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .cloned();

    tracing::debug!(
        request_id = request_id.as_ref().and_then(|v| v.to_str().ok()),
        method = %method,
        path = %path,
        "Routing request"
    );

    let mut response = match state.router.match_request(request).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(
                request_id = request_id.as_ref().and_then(|v| v.to_str().ok()),
                path = %path,
                error = %error,
                "Dispatch failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    };

    if let Some(id) = request_id {
        response.headers_mut().insert(X_REQUEST_ID, id);
    }

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

/// Wait for Ctrl+C or an explicit shutdown trigger.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = shutdown.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}
