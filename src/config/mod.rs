//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional) → process environment
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → passed explicitly into the workflow
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the core never reads the environment itself
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_env_file, load_unvalidated, read_config, ConfigError};
pub use schema::{AppConfig, NodeConfig, ObservabilityConfig, PackageConfig, TransactionConfig};
pub use validation::{validate_config, ValidationError};
