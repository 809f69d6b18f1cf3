//! CLI error handling with semantic exit codes.
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Listing printed, even if some nodes could not be probed or the node list could not be read |
//! | 1 | `InvalidDomain` | The operating domain did not answer |
//! | 1 | `Internal` | Anything else unexpected |
//! | 2 | `Usage` | Invalid arguments or configuration |
//!
//! A node list that cannot be fetched is not a process failure: it is written
//! to the error log and the header is printed with no rows.

use std::fmt;
use std::process::ExitCode;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The domain failed the reachability check (exit code 1).
    InvalidDomain,
    /// Invalid arguments or configuration (exit code 2).
    Usage,
    /// Unexpected failure, such as an unwritable log file (exit code 1).
    Internal,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::InvalidDomain | Self::Internal => 1,
            Self::Usage => 2,
        }
    }

    /// Create an `ExitCode` from this category.
    #[must_use]
    pub fn as_exit_code(self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }

    /// Categorize a core error.
    #[must_use]
    pub const fn from_core(error: &hola_core::Error) -> Self {
        use hola_core::Error;
        match error {
            Error::InvalidDomain(_) => Self::InvalidDomain,
            Error::Config(_) => Self::Usage,
            Error::Network(_) | Error::Parse(_) | Error::Schema(_) => Self::Internal,
        }
    }
}

/// A CLI error with a semantic category for exit code mapping.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Internal, source)
    }

    /// Get the exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        self.category.as_exit_code()
    }
}

impl From<hola_core::Error> for CliError {
    fn from(error: hola_core::Error) -> Self {
        Self::new(ErrorCategory::from_core(&error), error)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}
