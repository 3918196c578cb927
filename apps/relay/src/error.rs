//! Error handling for the Jukewire relay
//!
//! Nothing in the relay is process-fatal past startup: backend outages
//! and directory failures degrade locally at their call sites. These
//! types cover the paths that do propagate, mostly construction and
//! configuration.

use thiserror::Error;

use jukewire_mopidy_client::MopidyError;

/// Relay error type
#[derive(Error, Debug)]
pub enum RelayError {
    /// Configuration error at startup
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Playback backend call failed or timed out
    #[error("playback backend error: {0}")]
    Backend(#[from] MopidyError),

    /// Identity directory lookup failed
    #[error("identity directory error: {0}")]
    Directory(#[from] reqwest::Error),
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
