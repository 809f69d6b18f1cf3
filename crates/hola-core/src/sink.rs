//! Error reporting side channel.
//!
//! The pipeline never propagates probe failures; it hands them to an
//! [`ErrorSink`] and carries on. The CLI installs [`TracingErrorSink`], whose
//! events end up in the error log file. Tests use [`MemoryErrorSink`] to
//! assert on what was recorded without touching the filesystem.

use crate::Error;
use std::sync::{Mutex, PoisonError};

/// Receives every error the pipeline swallows.
pub trait ErrorSink: Send + Sync {
    /// Record `error`, which occurred while doing `context`.
    fn record_error(&self, context: &str, error: &Error);
}

/// Forwards errors to `tracing` at ERROR level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn record_error(&self, context: &str, error: &Error) {
        tracing::error!(category = error.category(), "{context}: {error}");
    }
}

/// Keeps recorded errors in memory.
#[derive(Debug, Default)]
pub struct MemoryErrorSink {
    entries: Mutex<Vec<String>>,
}

impl MemoryErrorSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded entries, formatted as `"{context}: {error}"`.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded errors.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorSink for MemoryErrorSink {
    fn record_error(&self, context: &str, error: &Error) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{context}: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemoryErrorSink::new();
        assert!(sink.is_empty());

        sink.record_error("node listing", &Error::Parse("unexpected EOF".into()));
        sink.record_error("metacat version", &Error::Schema("no root".into()));

        assert_eq!(
            sink.entries(),
            vec![
                "node listing: Parse error: unexpected EOF".to_string(),
                "metacat version: Schema error: no root".to_string(),
            ]
        );
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_tracing_sink_is_object_safe() {
        let sink: Box<dyn ErrorSink> = Box::new(TracingErrorSink);
        sink.record_error("registry validation", &Error::Parse("unexpected end of document".into()));
    }
}
