//! Error types for the sitewatch crawler
//!
//! This module defines the domain errors raised by each stage of a run.

use thiserror::Error;

/// Errors that can occur while fetching a page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Timeouts and 5xx/429 responses are worth another run; the crawler itself never retries.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 429 | 500..=599),
            Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors that can occur while reading fields out of a page or setting up the site
#[derive(Error, Debug)]
pub enum ParseError {
    /// The configured site does not form a valid root URL
    #[error("Invalid site root: {0}")]
    InvalidSite(String),

    /// An expected element was missing or empty
    #[error("Field not found: {0}")]
    FieldNotFound(&'static str),
}

/// Errors raised by the persistent link store
///
/// A unique-constraint rejection is not an error; see
/// [`AddOutcome::AlreadyExists`](crate::storage::AddOutcome::AlreadyExists).
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem failure while preparing the database file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
