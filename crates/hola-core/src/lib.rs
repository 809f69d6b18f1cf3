//! # hola-core
//!
//! Core functionality for node-hola: enumerate the member nodes of a DataONE
//! operating domain and identify the server software each one runs.
//!
//! ## Architecture
//!
//! - **Registry**: reachability check and node list retrieval from a
//!   coordinating node (`/cn/v2`, `/cn/v2/node`)
//! - **Prober**: per-node classification as GMN or Metacat, with version
//! - **Survey**: the end-to-end pipeline, with optional bounded concurrency
//! - **Error sink**: where swallowed per-node failures are reported
//!
//! ## Quick Start
//!
//! ```no_run
//! use hola_core::{Config, Survey, TracingErrorSink};
//! use std::sync::Arc;
//!
//! # async fn example() -> hola_core::Result<()> {
//! let config = Config::load()?;
//! let survey = Survey::from_config(&config, Arc::new(TracingErrorSink))?;
//!
//! for report in survey.run("cn.dataone.org").await? {
//!     println!("{} {} {}", report.identifier, report.server_type, report.version);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Only [`Survey::prepare`] (and so [`Survey::run`]) can fail, when the domain
//! is unreachable or its node list cannot be read. Probing a node always
//! yields a row; failures are handed to the [`ErrorSink`] instead.

/// Layered configuration (defaults, TOML file, environment)
pub mod config;
/// Error types and result aliases
pub mod error;
/// HTTP client construction and URL helpers
pub mod http;
/// Member node server classification
pub mod prober;
/// Registry reachability and node listing
pub mod registry;
/// Error reporting side channel
pub mod sink;
/// Pipeline driver
pub mod survey;
/// Core data types
pub mod types;

// Re-export commonly used types
pub use config::{Config, HttpConfig, LogConfig, OutputConfig, ProbeConfig};
pub use error::{Error, Result};
pub use prober::{NodeProber, StripMode};
pub use registry::RegistryClient;
pub use sink::{ErrorSink, MemoryErrorSink, TracingErrorSink};
pub use survey::Survey;
pub use types::*;
