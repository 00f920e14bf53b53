//! Structured logging setup using tracing
//!
//! Console output is always on. With `logging.local_enabled` a JSON layer is
//! added that writes to rolling files under `logging.local_path`.

use crate::config::LoggingConfig;
use crate::domain::{PipelineError, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "orderflow.log";

/// Keeps the file writer alive; drop it last so buffered lines are flushed
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `level`. Calling this twice in one
/// process fails, since the global subscriber can only be set once.
///
/// # Example
///
/// ```no_run
/// use orderflow::config::LoggingConfig;
/// use orderflow::logging::init_logging;
///
/// let _guard = init_logging("debug", &LoggingConfig::default()).unwrap();
/// tracing::debug!("visible");
/// ```
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = build_filter(parse_log_level(level)?);

    let mut layers = vec![tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(filter.clone())
        .boxed()];

    let mut file_guard = None;
    if config.local_enabled {
        let (writer, guard) = open_log_file(config)?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_writer(writer)
                .with_filter(filter)
                .boxed(),
        );
        file_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| PipelineError::Configuration(format!("Failed to initialize logging: {e}")))?;

    tracing::debug!(
        file_logging = config.local_enabled,
        log_dir = %config.local_path.display(),
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("orderflow={level}")))
}

fn open_log_file(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    let rotation = parse_rotation(&config.local_rotation)?;

    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        PipelineError::Configuration(format!(
            "Cannot create log directory {}: {e}",
            config.local_path.display()
        ))
    })?;

    let appender = RollingFileAppender::new(rotation, &config.local_path, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

fn parse_log_level(level: &str) -> Result<Level> {
    level.trim().parse::<Level>().map_err(|_| {
        PipelineError::Configuration(format!(
            "Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error"
        ))
    })
}

fn parse_rotation(rotation: &str) -> Result<Rotation> {
    match rotation.to_lowercase().as_str() {
        "daily" => Ok(Rotation::DAILY),
        "hourly" => Ok(Rotation::HOURLY),
        "never" => Ok(Rotation::NEVER),
        other => Err(PipelineError::Configuration(format!(
            "Invalid log rotation '{other}'. Must be one of: daily, hourly, never"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case("trace", Level::TRACE)]
    #[test_case("debug", Level::DEBUG)]
    #[test_case("INFO", Level::INFO)]
    #[test_case("Warn", Level::WARN)]
    #[test_case("error", Level::ERROR)]
    fn test_parse_log_level(input: &str, expected: Level) {
        assert_eq!(parse_log_level(input).unwrap(), expected);
    }

    #[test_case("verbose")]
    #[test_case("")]
    fn test_parse_log_level_rejects(input: &str) {
        assert!(matches!(
            parse_log_level(input),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("daily").unwrap(), Rotation::DAILY);
        assert_eq!(parse_rotation("HOURLY").unwrap(), Rotation::HOURLY);
        assert_eq!(parse_rotation("never").unwrap(), Rotation::NEVER);
        assert!(parse_rotation("size").is_err());
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = TempDir::new().unwrap();
        let config = LoggingConfig {
            local_enabled: true,
            local_path: dir.path().join("nested").join("logs"),
            local_rotation: "never".to_string(),
        };

        let (_writer, guard) = open_log_file(&config).unwrap();
        assert!(config.local_path.is_dir());
        drop(guard);
    }
}
