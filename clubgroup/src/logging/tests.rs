use crate::config::{LogFormat, LogLevel, LoggingConfig};
use crate::logging::{build_filter, create_non_blocking_file, level_to_log_level, parse_log_level};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_level_conversion() {
    assert_eq!(parse_log_level("TRACE").unwrap(), LogLevel::Trace);
    assert_eq!(parse_log_level("warn").unwrap(), LogLevel::Warn);
    assert!(parse_log_level("verbose").is_err());

    assert_eq!(level_to_log_level(tracing::Level::DEBUG), LogLevel::Debug);
    assert_eq!(level_to_log_level(tracing::Level::ERROR), LogLevel::Error);
}

#[test]
fn test_filter_directives() {
    // RUST_LOG takes precedence; only check directive parsing when it is unset
    if std::env::var("RUST_LOG").is_ok() {
        return;
    }

    let config = LoggingConfig {
        directives: Some("surrealdb=warn,clubgroup::lifecycle=trace".to_string()),
        ..LoggingConfig::default()
    };
    assert!(build_filter(&config).is_ok());

    let config = LoggingConfig {
        directives: Some("clubgroup=[".to_string()),
        ..LoggingConfig::default()
    };
    assert!(build_filter(&config).is_err());
}

#[test]
fn test_file_writer_creates_directories() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("nested").join("clubgroup.log");

    let mut writer = create_non_blocking_file(&log_path).unwrap();
    writer.write_all(b"hello\n").unwrap();

    assert!(log_path.parent().unwrap().exists());
}

#[test]
fn test_init_is_idempotent() {
    let config = LoggingConfig {
        level: LogLevel::Debug,
        format: LogFormat::Compact,
        ..LoggingConfig::default()
    };

    // Whichever call installs the subscriber, later calls are no-ops
    assert!(crate::logging::init(&config).is_ok());
    assert!(!crate::logging::init(&config).unwrap());
}
