use std::path::Path;

use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use backend_infrastructure::AppConfig;

const LOG_FILE_PREFIX: &str = "empire-backend.log";

/// Installs the global subscriber. `RUST_LOG` wins over the `info` default.
/// With `log_dir` set, output goes to a daily-rotated file through a
/// non-blocking writer whose guard must outlive the server.
pub fn init_tracing(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(dir) = config.log_dir.as_deref() else {
        let installed = if config.log_json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        installed.map_err(|err| anyhow!(err))?;
        return Ok(None);
    };

    std::fs::create_dir_all(Path::new(dir))?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let installed = if config.log_json {
        builder.json().with_writer(writer).try_init()
    } else {
        builder.with_ansi(false).with_writer(writer).try_init()
    };
    installed.map_err(|err| anyhow!(err))?;
    Ok(Some(guard))
}
