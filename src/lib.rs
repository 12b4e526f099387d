//! edge-router — request-routing engine for an edge-deployment adapter.
//!
//! Given an incoming HTTP request, the engine decides which served
//! artifact answers it — a static asset, a content-type-overridden asset,
//! or an invokable function — by evaluating an ordered routing manifest
//! composed of phased rule lists.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────────┐
//!                    │                    EDGE ROUTER                      │
//!                    │                                                     │
//!   Client Request   │  ┌─────────┐    ┌──────────────────────────────┐   │
//!   ─────────────────┼─▶│  http   │───▶│           routing            │   │
//!                    │  │ server  │    │ router → engine → matcher    │   │
//!                    │  └─────────┘    │          ↘ pattern, subst.   │   │
//!                    │                 └──────────────┬───────────────┘   │
//!                    │                                │ resolved entry    │
//!                    │                                ▼                   │
//!   Client Response  │  ┌─────────┐    ┌──────────────────────────────┐   │
//!   ◀────────────────┼──│ overlay │◀───│ serve: AssetFetcher /        │   │
//!                    │  │ headers │    │        FunctionInvoker       │   │
//!                    │  └─────────┘    └──────────────────────────────┘   │
//!                    │                                                     │
//!                    │  loaded once: manifest (phases, overrides,          │
//!                    │  basePath) + build-output entry map                  │
//!                    └────────────────────────────────────────────────────┘
//! ```
//!
//! The manifest and entry map are immutable after load; per-request
//! evaluation state never escapes its request.

// Core subsystems
pub mod config;
pub mod http;
pub mod manifest;
pub mod output;
pub mod routing;
pub mod serve;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::AdapterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use manifest::{load_manifest, CompiledManifest, RoutingManifest};
pub use output::{BuildOutput, OutputEntry};
pub use routing::router::EdgeRouter;
pub use serve::{AssetFetcher, DiskAssets, FunctionInvoker, FunctionRegistry, ServeError};
