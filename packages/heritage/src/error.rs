//! Typed errors for the heritage library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while loading and preparing the site set.
#[derive(Debug, Error)]
pub enum HeritageError {
    /// Remote data source failed
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Top-level response had neither `sites` nor `results.bindings`
    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: String },
}

/// Errors raised by remote collaborators (site source, image resolver).
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Http(Box::new(err))
        }
    }
}

/// Result type alias for heritage operations.
pub type Result<T> = std::result::Result<T, HeritageError>;

/// Result type alias for collaborator calls.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
