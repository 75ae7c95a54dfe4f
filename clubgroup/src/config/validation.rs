//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;
use crate::storage::config::{StorageBackend, StorageConfig, SurrealDBEngine};

/// Validate the entire configuration.
pub fn validate_config(config: &ClubGroupConfig) -> Result<(), ConfigError> {
    validate_storage_config(&config.storage)?;
    validate_notification_config(&config.notifications, &config.storage)?;
    validate_hook_config(&config.hooks)?;

    Ok(())
}

/// Validate storage configuration.
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.backend != StorageBackend::SurrealDB {
        return Ok(());
    }

    if config.surrealdb.namespace.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "SurrealDB namespace cannot be empty".to_string(),
        ));
    }
    if config.surrealdb.database.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "SurrealDB database cannot be empty".to_string(),
        ));
    }
    if config.surrealdb.engine == SurrealDBEngine::RocksDB
        && config.surrealdb.connection.trim().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "RocksDB engine requires a data path in `connection`".to_string(),
        ));
    }

    Ok(())
}

/// Validate notification configuration against the chosen store.
fn validate_notification_config(
    config: &NotificationConfig,
    storage: &StorageConfig,
) -> Result<(), ConfigError> {
    match config.backend {
        NotificationBackend::Memory => {}
        NotificationBackend::SurrealDB => {
            if storage.backend != StorageBackend::SurrealDB {
                return Err(ConfigError::ValidationError(
                    "SurrealDB notifications require the SurrealDB storage backend".to_string(),
                ));
            }
        }
        NotificationBackend::Webhook => {
            let url = config.webhook.url.as_deref().map(str::trim).unwrap_or("");
            if url.is_empty() {
                return Err(ConfigError::ValidationError(
                    "Webhook notifications require `notifications.webhook.url`".to_string(),
                ));
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "Webhook URL must be http(s): {}",
                    url
                )));
            }
            if !matches!(config.webhook.method.to_uppercase().as_str(), "POST" | "PUT") {
                return Err(ConfigError::ValidationError(format!(
                    "Webhook method must be POST or PUT, got {}",
                    config.webhook.method
                )));
            }
            if config.webhook.timeout_ms == 0 {
                return Err(ConfigError::ValidationError(
                    "Webhook timeout must be greater than zero".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_hook_config(config: &HookConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Hook timeout must be greater than zero".to_string(),
        ));
    }
    if config.failure_channel_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Failure channel capacity must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
