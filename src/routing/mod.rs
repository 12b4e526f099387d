//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, url, headers, cookies)
//!     → router.rs (phase state machine, entry resolution, dispatch)
//!     → engine.rs (one phase: filter rules, accumulate state, rewrite path)
//!     → matcher.rs (method / has / missing / requiredStatus filters)
//!     → pattern.rs (path pattern → captures)
//!     → substitute.rs ($0/$n/$name template rewriting)
//!
//! Manifest Compilation (at startup):
//!     RoutingManifest
//!     → compile patterns and condition patterns
//!     → Freeze as immutable CompiledManifest
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at startup, immutable at runtime
//! - Rule order is evaluation order; first match wins unless `continue`
//! - Per-request state is a stack value; phases never share mutable state
//!   across requests
//! - Rule evaluation never suspends; the only awaits are asset fetch and
//!   function invocation

pub mod engine;
pub mod matcher;
pub mod pattern;
pub mod router;
pub mod substitute;

pub use engine::{evaluate_phase, EvaluationState, PhaseOutcome};
pub use matcher::RequestContext;
pub use pattern::{MatchOutcome, Pattern};
pub use router::EdgeRouter;
pub use substitute::substitute;
