//! Logging initialization.
//!
//! Two layers share one subscriber:
//!
//! - stderr, at a level picked from `-v`/`-q` (`RUST_LOG` when neither is given)
//! - the error log file, ERROR only, appended to across runs

use anyhow::{Context, Result, anyhow};
use std::io::IsTerminal;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::Cli;

/// Stderr level for the given flags, `None` when `RUST_LOG` should decide.
pub const fn stderr_level(cli: &Cli) -> Option<LevelFilter> {
    if cli.verbose {
        Some(LevelFilter::DEBUG)
    } else if cli.quiet {
        Some(LevelFilter::ERROR)
    } else {
        None
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the error log when dropped and must be held
/// until the process is done logging.
///
/// # Errors
///
/// Returns an error if the error log cannot be opened or a global subscriber
/// is already installed.
pub fn initialize_logging(cli: &Cli, error_log: &Path) -> Result<WorkerGuard> {
    let stderr_filter = match stderr_level(cli) {
        Some(level) => EnvFilter::default().add_directive(level.into()),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::WARN.into())),
    };

    let (writer, guard) = tracing_appender::non_blocking(open_error_log(error_log)?);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_filter(stderr_filter);
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

fn open_error_log(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("error log path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("failed to open error log {}", path.display()))
}
