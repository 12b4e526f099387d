//! Adapter configuration subsystem.
//!
//! # Data Flow
//! ```text
//! edge-router.toml
//!     → loader.rs (read, parse)
//!     → validation.rs (semantic checks, all errors collected)
//!     → Frozen AdapterConfig handed to startup
//! ```
//!
//! The routing manifest itself is not configuration — it is build output,
//! loaded by the `manifest` module.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AdapterConfig;
