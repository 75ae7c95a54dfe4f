//! Configuration model definitions.

use crate::storage::config::StorageConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ClubGroupConfig {
    /// Document store configuration
    pub storage: StorageConfig,

    /// Where creation notifications go
    pub notifications: NotificationConfig,

    /// Post-hook and observer settings
    pub hooks: HookConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Notification sink selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationBackend {
    /// Keep notifications in memory
    Memory,
    /// Write to the `notification` table next to the groups
    #[default]
    #[serde(rename = "surrealdb")]
    SurrealDB,
    /// POST to a remote endpoint
    Webhook,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct NotificationConfig {
    pub backend: NotificationBackend,

    /// Settings for the webhook backend
    pub webhook: WebhookConfig,
}

/// Webhook sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebhookConfig {
    /// Endpoint URL (required for the webhook backend)
    pub url: Option<String>,

    /// POST or PUT
    pub method: String,

    /// Extra request headers
    pub headers: HashMap<String, String>,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// Backoff before the first retry, doubled each time
    pub initial_backoff_ms: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            method: "POST".to_string(),
            headers: HashMap::new(),
            timeout_ms: 10_000,
            max_retries: 3,
            initial_backoff_ms: 100,
        }
    }
}

/// Hook execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HookConfig {
    /// Timeout for the creation notification and the cascade policy
    pub timeout_ms: u64,

    /// Buffered post-hook failures per subscriber before the oldest are dropped
    pub failure_channel_capacity: usize,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            failure_channel_capacity: 64,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// Extra filter directives, e.g. `surrealdb=warn`
    pub directives: Option<String>,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            directives: None,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Same as pretty
    Default,
    Json,
    Compact,
    Pretty,
}
