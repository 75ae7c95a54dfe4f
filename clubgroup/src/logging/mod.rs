//! Structured logging setup.
//!
//! Installs a global `tracing` subscriber from [`LoggingConfig`]: pretty,
//! compact or JSON output, to stdout, a file, or both. `RUST_LOG` overrides the
//! configured level and directives when set.

#[cfg(test)]
mod tests;

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use std::sync::OnceLock;
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Keeps the file writer flushing for the life of the process
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Error type for logging operations
#[derive(Debug)]
pub enum LogError {
    /// IO error occurred
    IoError(std::io::Error),

    /// Error parsing log level
    InvalidLogLevel(String),

    /// Filter directives could not be parsed
    InvalidDirectives(String),

    /// Error in subscriber setup
    SubscriberError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(e) => write!(f, "IO error: {}", e),
            LogError::InvalidLogLevel(s) => write!(f, "Invalid log level: {}", s),
            LogError::InvalidDirectives(s) => write!(f, "Invalid filter directives: {}", s),
            LogError::SubscriberError(e) => write!(f, "Subscriber error: {}", e),
        }
    }
}

impl std::error::Error for LogError {}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Initialize the logging system with the given configuration.
///
/// Returns `Ok(false)` without touching anything when a global subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<bool> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let filter = build_filter(config)?;

    match (&config.file, config.stdout) {
        (Some(path), true) => {
            let writer = create_non_blocking_file(path)?;
            install(config.format, filter, std::io::stdout.and(writer))?;
        }
        (Some(path), false) => {
            let writer = create_non_blocking_file(path)?;
            install(config.format, filter, writer)?;
        }
        (None, true) => install(config.format, filter, std::io::stdout)?,
        (None, false) => return Ok(false),
    }

    tracing::debug!(level = %config.level, format = ?config.format, "logging initialized");
    Ok(true)
}

/// Level and directives from the config, unless `RUST_LOG` is set
fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV)
        && !env.trim().is_empty()
    {
        return EnvFilter::try_new(&env).map_err(|e| LogError::InvalidDirectives(e.to_string()));
    }

    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(to_level(config.level)).into())
        .parse(config.directives.as_deref().unwrap_or_default())
        .map_err(|e| LogError::InvalidDirectives(e.to_string()))
}

fn install<W>(format: LogFormat, filter: EnvFilter, writer: W) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_level(true)
        .with_target(true)
        .with_line_number(true);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty | LogFormat::Default => builder.pretty().try_init(),
    };

    result.map_err(LogError::SubscriberError)
}

/// Create a non-blocking file writer whose guard lives until process exit.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<NonBlocking> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| LogError::IoError(std::io::Error::other("log file path has no file name")))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    Ok(non_blocking)
}

fn to_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    level.parse().map_err(|_| LogError::InvalidLogLevel(level.to_string()))
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}
