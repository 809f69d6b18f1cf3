//! # CLI Structure and Argument Parsing
//!
//! `node-hola` takes a single operating domain and prints one row per member
//! node. Every option other than the domain has a config file or environment
//! counterpart (see [`hola_core::config`]); flags given here win.
//!
//! ```bash
//! node-hola cn.dataone.org
//! node-hola cn-stage.test.dataone.org --format json --concurrency 8
//! node-hola cn.dataone.org --no-status --log-file /tmp/hola-errors.log
//! ```

use crate::output::OutputFormat;
use clap::Parser;
use hola_core::{Config, StripMode};
use std::path::PathBuf;

/// List the member nodes of a DataONE operating domain with their server
/// software and version.
#[derive(Parser, Clone, Debug)]
#[command(name = "node-hola")]
#[command(version)]
#[command(about = "List DataONE member nodes and the server software they run", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Operating domain of the coordinating node, e.g. `cn.dataone.org`
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Include the `mn_status` column
    #[arg(long, overrides_with = "no_status")]
    pub status: bool,

    /// Omit the `mn_status` column
    #[arg(long, overrides_with = "status")]
    pub no_status: bool,

    /// Number of nodes probed at once
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// File that errors are appended to
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// How `/d1/mn` is removed from a base URL to find Metacat (exact, charset)
    #[arg(long, value_name = "MODE")]
    pub strip_mode: Option<StripMode>,

    /// Config file to load instead of the default location
    #[arg(long, value_name = "PATH", env = "NODE_HOLA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show errors on stderr
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.probe.concurrency = usize::from(concurrency);
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout_secs = timeout;
        }
        if let Some(path) = &self.log_file {
            config.log.error_log.clone_from(path);
        }
        if let Some(mode) = self.strip_mode {
            config.probe.strip_mode = mode;
        }
        if self.status {
            config.output.show_status = true;
        } else if self.no_status {
            config.output.show_status = false;
        }
    }
}
