use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr
/// so report output on stdout stays clean, or to a daily rolling file when a
/// log directory is configured. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init_tracing(config: &LogConfig) -> Result<WorkerGuard> {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(&config.level))
    .map_err(|e| eyre!("Invalid log level '{}': {}", config.level, e))?;

  let (writer, guard) = match &config.directory {
    Some(dir) => {
      std::fs::create_dir_all(dir)
        .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;
      tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "cardpulse.log"))
    }
    None => tracing_appender::non_blocking(std::io::stderr()),
  };

  fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(config.directory.is_none())
    .with_target(true)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}
