//! Mopidy API error types

use thiserror::Error;

/// Mopidy JSON-RPC client errors
#[derive(Error, Debug)]
pub enum MopidyError {
    /// The configured base URL could not be parsed
    #[error("invalid Mopidy base URL: {0}")]
    InvalidBaseUrl(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("request to Mopidy timed out")]
    Timeout,

    /// JSON parsing failed
    #[error("failed to parse Mopidy response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Mopidy returned a JSON-RPC error object
    #[error("Mopidy RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl MopidyError {
    /// True when the failure is a transport problem rather than a
    /// malformed or rejected response. Callers use this to decide log
    /// severity; nothing is retried automatically.
    pub fn is_transport(&self) -> bool {
        matches!(self, MopidyError::Http(_) | MopidyError::Timeout)
    }
}

/// Result type for Mopidy operations
pub type MopidyResult<T> = Result<T, MopidyError>;
