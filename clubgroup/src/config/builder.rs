//! Configuration builder.

use super::{Result, models::*, validation};
use crate::storage::config::{StorageBackend, SurrealDBEngine};
use std::path::{Path, PathBuf};

/// Builder for creating [`ClubGroupConfig`] instances.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: ClubGroupConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the in-process store and notifier (no database)
    pub fn with_memory_storage(mut self) -> Self {
        self.config.storage.backend = StorageBackend::Memory;
        self.config.notifications.backend = NotificationBackend::Memory;
        self
    }

    /// Use embedded SurrealDB with the in-memory engine
    pub fn with_surrealdb_memory(mut self) -> Self {
        self.config.storage.backend = StorageBackend::SurrealDB;
        self.config.storage.surrealdb.engine = SurrealDBEngine::Memory;
        self
    }

    /// Use embedded SurrealDB persisted with RocksDB under `path`
    pub fn with_surrealdb_rocksdb<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.storage.backend = StorageBackend::SurrealDB;
        self.config.storage.surrealdb.engine = SurrealDBEngine::RocksDB;
        self.config.storage.surrealdb.connection = path.as_ref().to_string_lossy().to_string();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.config.storage.surrealdb.namespace = namespace.into();
        self.config.storage.surrealdb.database = database.into();
        self
    }

    pub fn with_notification_backend(mut self, backend: NotificationBackend) -> Self {
        self.config.notifications.backend = backend;
        self
    }

    /// Deliver notifications to a webhook
    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.config.notifications.backend = NotificationBackend::Webhook;
        self.config.notifications.webhook.url = Some(url.into());
        self
    }

    pub fn with_hook_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.hooks.timeout_ms = timeout_ms;
        self
    }

    pub fn with_failure_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.hooks.failure_channel_capacity = capacity;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Development: embedded in-memory SurrealDB, debug logs.
    pub fn development() -> Self {
        Self::new()
            .with_surrealdb_memory()
            .with_notification_backend(NotificationBackend::SurrealDB)
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Testing: no database at all, quiet logs.
    pub fn testing() -> Self {
        Self::new()
            .with_memory_storage()
            .with_log_level(LogLevel::Warn)
            .with_log_format(LogFormat::Compact)
    }

    /// Production: RocksDB under the user's data directory, JSON logs.
    pub fn production() -> Self {
        let data_dir = directories::ProjectDirs::from("org", "clubgroup", "clubgroup")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./data"));

        Self::new()
            .with_surrealdb_rocksdb(data_dir.join("groups"))
            .with_notification_backend(NotificationBackend::SurrealDB)
            .with_log_level(LogLevel::Info)
            .with_log_format(LogFormat::Json)
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<ClubGroupConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}
