//! Routing-manifest subsystem.
//!
//! # Data Flow
//! ```text
//! Build output (config.json)
//!     → schema.rs (serde data model: phases, rules, conditions, overrides)
//!     → load.rs (version check, pattern compilation)
//!     → Frozen CompiledManifest, shared via Arc for the process lifetime
//! ```
//!
//! # Design Decisions
//! - Every rule pattern and condition pattern compiles at load time;
//!   a malformed pattern is a configuration error, never a request error
//! - The manifest is immutable after load (no reload path)
//! - Unknown rule fields from newer platform versions are ignored

pub mod load;
pub mod schema;

pub use load::{load_manifest, CompiledManifest, CompiledRule, ManifestError};
pub use schema::{Condition, OverrideSpec, Phase, PhaseRules, RouteRule, RoutingManifest};
