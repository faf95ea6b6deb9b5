use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::infra::{config::LogConfig, error::AppError, storage_layout::StorageLayout};

/// Installs the global subscriber. With `config.file` set, events go to a
/// file in the data dir so they do not interleave with the shell; the
/// returned guard must live until exit to flush them.
pub fn init(config: &LogConfig, layout: &StorageLayout) -> Result<Option<WorkerGuard>, AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.file {
        let appender = tracing_appender::rolling::never(&layout.log_dir, layout.log_file_name());
        let (writer, guard) = tracing_appender::non_blocking(appender);

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
            .try_init()
            .map_err(AppError::LoggingInit)?;

        return Ok(Some(guard));
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(AppError::LoggingInit)?;

    Ok(None)
}
