//! Error types and handling for hola-core operations.
//!
//! Every network call site in the pipeline converts its failure into one of
//! these variants before handing it to an [`ErrorSink`](crate::sink::ErrorSink).
//! Only two operations ever return them to the caller: validating the domain
//! and listing the registry's nodes. Probing a node never fails.
//!
//! ## Error Categories
//!
//! - **Network Errors**: DNS, connection, timeout and non-success status codes
//! - **Parse Errors**: XML that the strict reader rejects
//! - **Schema Errors**: well-formed XML that breaks the node list contract
//! - **Configuration Errors**: unreadable or invalid settings
//! - **Domain Errors**: the operating domain does not answer at all

use thiserror::Error;

/// The main error type for hola-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Network operation failed.
    ///
    /// Covers transport failures (DNS, refused connections, timeouts) as well
    /// as non-success statuses surfaced through `error_for_status`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A document could not be parsed.
    ///
    /// Raised by the strict XML reader used for the registry node list and the
    /// Metacat version document.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A well-formed registry document does not follow the node list schema.
    ///
    /// For example a `type="mn"` entry without an `identifier` or `baseURL`.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The operating domain failed the reachability check.
    #[error("Domain \"{0}\" not valid DataONE CN operating domain")]
    InvalidDomain(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Parse(format!("XML parse error: {err}"))
    }
}

impl Error {
    /// Get the error category as a string identifier.
    ///
    /// Used as a structured field when errors are logged.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Schema(_) => "schema",
            Self::Config(_) => "config",
            Self::InvalidDomain(_) => "invalid_domain",
        }
    }

    /// Returns `true` when the failure happened before any HTTP response arrived.
    ///
    /// A non-success status is a response, so it does not count as a transport
    /// failure.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(e) if e.status().is_none() && !e.is_decode() && !e.is_body())
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
