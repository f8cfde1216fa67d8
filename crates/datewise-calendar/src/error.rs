//! Error types for datewise-calendar

use thiserror::Error;

/// Errors that can occur while querying the special-day service
#[derive(Error, Debug)]
pub enum CalendarError {
    /// Service key not configured (or still a placeholder)
    #[error("KASI_API_KEY is not set.")]
    MissingServiceKey,

    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Service answered with a non-success status
    #[error("service returned status {0}")]
    Status(u16),

    /// Body was not the expected JSON document
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CalendarError {
    fn from(err: reqwest::Error) -> Self {
        CalendarError::Http(err.to_string())
    }
}

/// Result type for calendar lookups.
pub type Result<T> = std::result::Result<T, CalendarError>;
