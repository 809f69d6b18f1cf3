//! Configuration management for node-hola.
//!
//! Settings are layered, later layers winning:
//!
//! 1. **Defaults**: [`Config::default`]
//! 2. **Config file**: `$NODE_HOLA_CONFIG`, or `config.toml` in the platform
//!    config directory (`~/.config/node-hola/config.toml` on Linux)
//! 3. **Environment variables**: `NODE_HOLA_*` (see [`Config::apply_env`])
//! 4. **CLI flags**: applied by the CLI after loading
//!
//! ## Example Configuration File
//!
//! ```toml
//! [http]
//! timeout_secs = 20
//!
//! [probe]
//! concurrency = 4
//! strip_mode = "exact"
//!
//! [output]
//! show_status = true
//!
//! [log]
//! error_log = "/var/log/node-hola/errors.log"
//! ```

use crate::http::USER_AGENT;
use crate::prober::StripMode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "NODE_HOLA_CONFIG";

const ENV_TIMEOUT: &str = "NODE_HOLA_TIMEOUT_SECS";
const ENV_USER_AGENT: &str = "NODE_HOLA_USER_AGENT";
const ENV_CONCURRENCY: &str = "NODE_HOLA_CONCURRENCY";
const ENV_STRIP_MODE: &str = "NODE_HOLA_STRIP_MODE";
const ENV_SHOW_STATUS: &str = "NODE_HOLA_SHOW_STATUS";
const ENV_ERROR_LOG: &str = "NODE_HOLA_ERROR_LOG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP client settings
    pub http: HttpConfig,
    /// Probing behavior
    pub probe: ProbeConfig,
    /// Row rendering
    pub output: OutputConfig,
    /// Error log location
    pub log: LogConfig,
}

/// HTTP client settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds. A hung node stalls its row for at most this long.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Probing behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Nodes probed at once. `1` probes strictly one after another.
    pub concurrency: usize,
    /// How `/d1/mn` is removed when deriving the Metacat URL.
    pub strip_mode: StripMode,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            strip_mode: StripMode::default(),
        }
    }
}

/// Row rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit the `mn_status` column.
    pub show_status: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { show_status: true }
    }
}

/// Error log location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// File errors are appended to.
    pub error_log: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            error_log: PathBuf::from("errors.log"),
        }
    }
}

impl Config {
    /// Load configuration from the default location, then apply environment overrides.
    ///
    /// A missing config file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, if
    /// an override holds an invalid value, or if the result fails
    /// [`Config::validate`].
    pub fn load() -> Result<Self> {
        let config = Self::load_with(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file and environment layers without validating.
    ///
    /// An `explicit` file is read instead of the default location and must
    /// exist. Callers that layer more settings on top run
    /// [`Config::validate`] once they are done.
    pub fn load_with(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {e}", path.display())))
    }

    /// Where the config file is looked for.
    ///
    /// `$NODE_HOLA_CONFIG` wins; otherwise the platform config directory.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(explicit));
        }
        directories::ProjectDirs::from("org", "dataone", "node-hola")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply `NODE_HOLA_*` overrides from the given variables.
    ///
    /// Takes the variables as an iterator so callers can pass
    /// `std::env::vars()` or a fixed list.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref().trim();
            match key.as_ref() {
                ENV_TIMEOUT => self.http.timeout_secs = parse_env(ENV_TIMEOUT, value)?,
                ENV_USER_AGENT => self.http.user_agent = value.to_string(),
                ENV_CONCURRENCY => self.probe.concurrency = parse_env(ENV_CONCURRENCY, value)?,
                ENV_STRIP_MODE => self.probe.strip_mode = parse_env(ENV_STRIP_MODE, value)?,
                ENV_SHOW_STATUS => self.output.show_status = parse_env(ENV_SHOW_STATUS, value)?,
                ENV_ERROR_LOG => self.log.error_log = PathBuf::from(value),
                _ => {},
            }
        }
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(Error::Config("http.timeout_secs must be at least 1".into()));
        }
        if self.probe.concurrency == 0 {
            return Err(Error::Config("probe.concurrency must be at least 1".into()));
        }
        if self.log.error_log.as_os_str().is_empty() {
            return Err(Error::Config("log.error_log must not be empty".into()));
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {key}: {e}")))
}
