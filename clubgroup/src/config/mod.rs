//! Configuration system.
//!
//! Configuration is layered: built-in defaults, then the first config file
//! found, then `CLUBGROUP_` environment variables. Nested keys use `__`, e.g.
//! `CLUBGROUP_STORAGE__BACKEND=memory`.

mod builder;
mod loader;
mod models;
#[cfg(test)]
mod tests;
mod validation;

pub use crate::storage::config::{StorageBackend, StorageConfig, SurrealDBConfig, SurrealDBEngine};
pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Default configuration file names that the loader will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "clubgroup.toml",
    "clubgroup.yaml",
    "clubgroup.yml",
    "clubgroup.json",
    ".clubgroup/config.toml",
    ".clubgroup/config.yaml",
    ".clubgroup/config.yml",
    ".clubgroup/config.json",
];

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CLUBGROUP_";

/// Separator for nested keys in environment variables
pub const ENV_SEPARATOR: &str = "__";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
