//! Error types for iconpack-dl
//!
//! Only configuration problems and invalid control transitions surface to
//! callers. Per-task fetch failures use the same [`Error`] type internally,
//! but the engine downgrades them to omissions from the result mapping.

use thiserror::Error;

/// Result type alias for iconpack-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for iconpack-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch_size")
        key: Option<String>,
    },

    /// A job is already active on this engine instance
    #[error("a transfer job is already active on this engine")]
    JobActive,

    /// Control operation not allowed in the job's current phase
    #[error("cannot {operation} a job that is {current_state}")]
    InvalidState {
        /// The operation that was attempted (e.g., "pause", "resume")
        operation: String,
        /// The phase that prevents the operation (e.g., "completed")
        current_state: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// Status code returned by the server
        status: u16,
    },

    /// Fetch did not finish within the configured timeout
    #[error("timed out fetching {0}")]
    Timeout(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip container error
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Archive entry path rejected before writing
    #[error("invalid archive entry path: {0}")]
    InvalidEntryPath(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a config key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Whether this error describes a single fetch that can be skipped
    ///
    /// Fetch-level failures are omitted from a job's result mapping instead
    /// of failing the job.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::HttpStatus { .. } | Error::Timeout(_)
        )
    }
}
