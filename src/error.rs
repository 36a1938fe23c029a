//! Unified error handling for the sitewatch crate
//!
//! Domain errors live next to the code that raises them (see
//! [`crate::utils::error`] and [`crate::notifications::channels`]). This module
//! folds them into a single [`Error`] for the crawl and publish setup paths;
//! the binary logs its category before handing it to `anyhow`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sitewatch::error::{Error, ErrorCategory, SitewatchErrorTrait};
//!
//! fn report(err: &Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!(category = ?err.category(), "{err}");
//!     } else {
//!         tracing::error!(category = ?err.category(), "{err}");
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::notifications::channels::ChannelError;
pub use crate::utils::error::{FetchError, ParseError, StoreError};

/// Common trait for all sitewatch error types
pub trait SitewatchErrorTrait: std::error::Error {
    /// Check if this error is worth retrying on a later run
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout)
    Network,
    /// Parsing and site setup errors
    Parsing,
    /// Storage and I/O errors
    Storage,
    /// Outbound notification errors
    Publish,
}

impl ErrorCategory {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Publish => "publish",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the sitewatch crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Link store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Notification channel errors
    #[error("Publish error: {0}")]
    Publish(#[from] ChannelError),
}

impl SitewatchErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(_) => false,
            Self::Store(StoreError::Sqlite(_)) => false,
            Self::Store(StoreError::Io(_)) => true,
            Self::Publish(e) => e.is_recoverable(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Parse(_) => ErrorCategory::Parsing,
            Self::Store(_) => ErrorCategory::Storage,
            Self::Publish(_) => ErrorCategory::Publish,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(err))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
