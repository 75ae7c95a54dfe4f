use crate::config::{
    ClubGroupConfig, ConfigBuilder, ConfigError, ConfigLoader, LogFormat, LogLevel,
    NotificationBackend, StorageBackend, SurrealDBEngine, validation,
};
use figment::Jail;

#[test]
fn test_default_config() {
    let config = ClubGroupConfig::default();
    assert_eq!(config.storage.backend, StorageBackend::SurrealDB);
    assert_eq!(config.storage.surrealdb.engine, SurrealDBEngine::Memory);
    assert_eq!(config.notifications.backend, NotificationBackend::SurrealDB);
    assert_eq!(config.hooks.timeout_ms, 5000);
    assert_eq!(config.logging.level, LogLevel::Info);
    assert!(validation::validate_config(&config).is_ok());
}

#[test]
fn test_predefined_configs() {
    let dev = ConfigBuilder::development().build().unwrap();
    assert_eq!(dev.storage.backend, StorageBackend::SurrealDB);
    assert_eq!(dev.logging.level, LogLevel::Debug);

    let test = ConfigBuilder::testing().build().unwrap();
    assert_eq!(test.storage.backend, StorageBackend::Memory);
    assert_eq!(test.notifications.backend, NotificationBackend::Memory);

    let prod = ConfigBuilder::production().build().unwrap();
    assert_eq!(prod.storage.surrealdb.engine, SurrealDBEngine::RocksDB);
    assert!(prod.storage.surrealdb.connection.ends_with("groups"));
    assert_eq!(prod.logging.format, LogFormat::Json);
}

#[test]
fn test_surreal_notifications_need_surreal_storage() {
    let err = ConfigBuilder::new()
        .with_memory_storage()
        .with_notification_backend(NotificationBackend::SurrealDB)
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn test_webhook_validation() {
    let err = ConfigBuilder::testing()
        .with_notification_backend(NotificationBackend::Webhook)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("webhook.url"));

    assert!(ConfigBuilder::testing().with_webhook("ftp://x").build().is_err());
    assert!(
        ConfigBuilder::testing()
            .with_webhook("https://hooks.example.com/groups")
            .build()
            .is_ok()
    );
}

#[test]
fn test_hook_limits_must_be_positive() {
    assert!(ConfigBuilder::testing().with_hook_timeout_ms(0).build().is_err());
    assert!(
        ConfigBuilder::testing()
            .with_failure_channel_capacity(0)
            .build()
            .is_err()
    );
}

#[test]
fn test_load_from_file_and_env() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "clubgroup.toml",
            r#"
            [storage]
            backend = "memory"

            [notifications]
            backend = "memory"

            [hooks]
            timeout_ms = 1000

            [logging]
            level = "debug"
            "#,
        )?;
        jail.set_env("CLUBGROUP_HOOKS__TIMEOUT_MS", "250");
        jail.set_env("CLUBGROUP_LOGGING__FORMAT", "json");

        let config = ConfigLoader::load().map_err(|e| e.to_string())?;

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.notifications.backend, NotificationBackend::Memory);
        // Environment overrides the file
        assert_eq!(config.hooks.timeout_ms, 250);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        // Untouched sections keep their defaults
        assert_eq!(config.hooks.failure_channel_capacity, 64);
        Ok(())
    });
}

#[test]
fn test_load_yaml_from_dot_directory() {
    Jail::expect_with(|jail| {
        jail.create_dir(".clubgroup")?;
        jail.create_file(
            ".clubgroup/config.yaml",
            "notifications:\n  backend: webhook\n  webhook:\n    url: http://localhost:9000/n\n    max_retries: 1\n",
        )?;

        let config = ConfigLoader::load().map_err(|e| e.to_string())?;
        assert_eq!(config.notifications.backend, NotificationBackend::Webhook);
        assert_eq!(config.notifications.webhook.max_retries, 1);
        assert_eq!(config.notifications.webhook.method, "POST");
        Ok(())
    });
}

#[test]
fn test_invalid_env_value_is_a_parse_error() {
    Jail::expect_with(|jail| {
        jail.set_env("CLUBGROUP_STORAGE__BACKEND", "cassandra");

        let err = ConfigLoader::load().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        Ok(())
    });
}

#[test]
fn test_missing_or_unsupported_files_are_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("clubgroup.ini", "x = 1")?;

        let mut loader = ConfigLoader::new();
        assert!(matches!(
            loader.load_file("missing.toml"),
            Err(ConfigError::FileLoadError(_))
        ));
        assert!(matches!(
            loader.load_file("clubgroup.ini"),
            Err(ConfigError::FileLoadError(_))
        ));
        // The loader is still usable afterwards
        assert!(loader.extract().is_ok());
        Ok(())
    });
}

#[test]
fn test_config_serialization_round_trip() {
    let config = ConfigBuilder::testing()
        .with_webhook("https://hooks.example.com/groups")
        .build()
        .unwrap();

    let json = serde_json::to_string(&config).unwrap();
    let deserialized: ClubGroupConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, deserialized);
}
