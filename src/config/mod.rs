//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ExporterConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow an empty or absent file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ExporterConfig, ListenerConfig, LogFormat, ObservabilityConfig, TargetConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
