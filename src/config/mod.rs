//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → ClientBuilder builds transport, cache and retry policy once
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the client is built; no runtime reconfiguration
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{CacheConfig, ClientConfig, ObservabilityConfig, RetryConfig};
pub use validation::{validate_config, ValidationError};
