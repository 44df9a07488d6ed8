//! Process-wide log sink
//!
//! The library itself only emits `tracing` events. Applications call
//! [`init_logging`] once at startup and keep the returned [`LogGuard`]
//! alive for as long as logs should be written; dropping it flushes and
//! stops the background writer.

use crate::config::LogConfig;
use crate::error::{Error, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the log writer running; flushes pending lines on drop
#[must_use = "dropping the guard stops log output"]
pub struct LogGuard {
    _worker: WorkerGuard,
}

/// Install the global subscriber writing to `config.log_file`
///
/// Lines are appended and carry thread name and id, timestamp, level,
/// message and structured fields. `RUST_LOG` takes precedence over
/// `config.level`.
///
/// # Errors
///
/// Returns [`Error::Config`] for an unusable log path or level, [`Error::Io`]
/// if the log directory cannot be created, and [`Error::Logging`] if a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<LogGuard> {
    let file_name = config
        .log_file
        .file_name()
        .ok_or_else(|| Error::config("log_file", "log file path has no file name"))?;
    let dir = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    std::fs::create_dir_all(dir).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create log directory '{}': {}", dir.display(), e),
        ))
    })?;

    let filter = build_filter(&config.level)?;

    let (writer, worker) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, file_name,
    ));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_thread_names(true)
                .with_thread_ids(true)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| Error::Logging(format!("Failed to initialize tracing: {}", e)))?;

    Ok(LogGuard { _worker: worker })
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|e| Error::config("level", e.to_string())),
    }
}
