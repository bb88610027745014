use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::Error;

/// Optional directory for a daily rolling log file. Logs go to stderr otherwise.
pub const LOG_DIR_ENV: &str = "SCORE_LOG_DIR";

/// Set to `1` or `true` for JSON log lines.
pub const LOG_JSON_ENV: &str = "SCORE_LOG_JSON";

const LOG_FILE_PREFIX: &str = "llm-score-adapter";

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub directory: Option<PathBuf>,
    pub json: bool,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            directory: std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
            json: std::env::var(LOG_JSON_ENV)
                .map(|v| matches!(v.trim(), "1" | "true"))
                .unwrap_or(false),
        }
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` selects the filter, `info` by default. Keep the returned guard alive
/// until the process exits, dropping it flushes pending log lines.
pub fn init(config: &LogConfig) -> Result<WorkerGuard, Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)?;
            tracing_appender::non_blocking(tracing_appender::rolling::daily(
                directory,
                LOG_FILE_PREFIX,
            ))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| Error::Logging(e.to_string()))?;

    if let Some(directory) = &config.directory {
        tracing::info!("Log directory: {}", directory.display());
    }

    Ok(guard)
}
