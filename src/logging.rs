use std::io::IsTerminal;

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config;

const DEFAULT_FILTER: &str = "warn,taskboard=info";

fn env_filter() -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))
}

/// Log to stderr. Used by the one-shot CLI commands.
pub fn init_stderr() -> Result<()> {
    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        tracing::debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

/// Log to a daily file under ~/.taskboard/logs/, since the board owns the
/// terminal. Keep the guard alive until exit or buffered lines are lost.
pub fn init_file() -> Result<WorkerGuard> {
    config::ensure_dirs()?;
    let appender = tracing_appender::rolling::daily(config::log_dir()?, "taskboard.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_target(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();

    if let Err(err) = init_result {
        tracing::debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(guard)
}
