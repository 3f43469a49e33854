//! Logging setup: a daily-rolling log file plus an optional console layer.

use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "hearhere.log";

/// Logging configuration.
pub struct LoggingConfig {
    pub level: Level,
    pub console_output: bool,
    /// Directory for rolling log files; `None` disables file output
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            console_output: cfg!(debug_assertions),
            log_dir: None,
        }
    }
}

/// Filter directive for this crate at `level`. `RUST_LOG` wins when set.
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("hear_here={}", level.as_str().to_lowercase()))
    })
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the lifetime of the process.
pub fn initialize_logging(config: LoggingConfig) -> std::io::Result<Option<WorkerGuard>> {
    let mut layers = Vec::new();
    let mut guard = None;

    if config.console_output {
        layers.push(fmt::layer().with_target(true).boxed());
    }

    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)?;

        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(non_blocking)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(env_filter(config.level))
        .with(layers)
        .init();

    Ok(guard)
}

/// Log directory under the application data directory.
pub fn log_dir(app_dir: &Path) -> PathBuf {
    app_dir.join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_dir_is_nested() {
        assert_eq!(
            log_dir(Path::new("data")),
            Path::new("data").join("logs")
        );
    }
}
