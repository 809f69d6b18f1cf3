//! node-hola CLI - list the member nodes of a DataONE operating domain and the
//! server software each one runs.
//!
//! The binary is a thin wrapper around [`run`]; everything that talks to the
//! network lives in `hola-core`.

use clap::Parser;
use futures::StreamExt;
use hola_core::{Config, NodeSet, Survey, TracingErrorSink};
use std::pin::pin;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

pub mod cli;
pub mod error;
pub mod logging;
pub mod output;

use crate::cli::Cli;
use crate::error::{CliError, ErrorCategory};
use crate::logging::initialize_logging;
use crate::output::RowWriter;

/// Execute the node-hola CLI with the current arguments and environment.
///
/// Returns the process exit code; see [`error`] for the mapping.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    match execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Domain failures already went through the error sink.
            if err.category != ErrorCategory::InvalidDomain {
                eprintln!("Error: {:#}", err.source);
            }
            err.exit_code()
        },
    }
}

/// Load configuration: file and environment first, then the flags in `cli`.
///
/// Validation runs once, after the flags are applied.
pub fn resolve_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load_with(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

async fn execute(cli: &Cli) -> Result<(), CliError> {
    let config = resolve_config(cli)?;
    let _guard = initialize_logging(cli, &config.log.error_log).map_err(CliError::internal)?;
    debug!(?config, "Resolved configuration");

    let survey = Survey::from_config(&config, Arc::new(TracingErrorSink))?;
    let nodes = match survey.prepare(&cli.domain).await {
        Ok(nodes) => nodes,
        Err(e @ hola_core::Error::InvalidDomain(_)) => return Err(e.into()),
        // Already in the error log; the listing is printed without rows.
        Err(_) => NodeSet::new(),
    };

    let mut writer = RowWriter::new(std::io::stdout(), cli.format, config.output.show_status);
    writer.begin().map_err(CliError::internal)?;

    let mut reports = pin!(survey.probe_stream(&nodes));
    while let Some(report) = reports.next().await {
        writer.write(&report).map_err(CliError::internal)?;
    }
    writer.finish().map_err(CliError::internal)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_config_layers_flags_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[probe]\nconcurrency = 2\n\n[http]\ntimeout_secs = 9\n").unwrap();

        let cli = Cli::parse_from([
            "node-hola",
            "cn.dataone.org",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "3",
        ]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.probe.concurrency, 2);
        assert_eq!(config.http.timeout_secs, 3);
    }

    #[test]
    fn test_resolve_config_reports_bad_file_as_usage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[probe]\nconcurrency = 0\n").unwrap();

        let cli = Cli::parse_from(["node-hola", "d", "--config", path.to_str().unwrap()]);
        let err = resolve_config(&cli).unwrap_err();

        assert_eq!(err.category, ErrorCategory::Usage);
    }

    #[test]
    fn test_resolve_config_flags_repair_bad_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[probe]\nconcurrency = 0\n").unwrap();

        let cli = Cli::parse_from([
            "node-hola",
            "d",
            "--config",
            path.to_str().unwrap(),
            "-j",
            "4",
        ]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.probe.concurrency, 4);
    }
}
