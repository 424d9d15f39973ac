//! Booking source error types.

use std::path::PathBuf;

/// Errors that can occur when fetching a booking.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (connection, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local booking data could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backend returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Payload was not a valid booking
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl SourceError {
    /// Whether the failure happened before any response arrived.
    pub fn is_transport(&self) -> bool {
        match self {
            SourceError::Http(e) => e.status().is_none(),
            SourceError::Io { .. } => true,
            SourceError::Api { .. } | SourceError::Json { .. } => false,
        }
    }

    /// The HTTP status the backend answered with, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Http(e) => e.status().map(|s| s.as_u16()),
            SourceError::Api { status, .. } => Some(*status),
            SourceError::Io { .. } | SourceError::Json { .. } => None,
        }
    }
}
