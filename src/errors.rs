//! Error types for the harness.
//!
//! These are the fatal errors that abort a run. Snapshot mismatches and
//! smoke assertion failures are findings and are modelled elsewhere.

use std::io;

use thiserror::Error;

use crate::host::ParseFailure;

/// Errors that abort harness processing.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// I/O failure reported by the file access adapter.
    #[error("i/o error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The parse adapter rejected a source file.
    #[error("parse error in {path}: {failure}")]
    Parse {
        path: String,
        #[source]
        failure: ParseFailure,
    },

    /// A parse result could not be turned into canonical JSON.
    #[error("failed to serialize parse result of {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Error loading a configuration or expected-mismatch file.
    #[error("failed to load config: {path}: {message}")]
    Config { path: String, message: String },
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;
