//! Persistent record of every reportable URL ever seen
//!
//! The store is append-only: one row per canonical URL, never updated or
//! deleted. Uniqueness is enforced by the table itself, so concurrent
//! workers racing to record the same URL get exactly one
//! [`AddOutcome::Inserted`] between them and [`AddOutcome::AlreadyExists`]
//! for everyone else.

pub mod repository;

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{DatabaseConfig, StoreHandleMode};
use crate::models::{CanonicalUrl, StoreRecord};
use crate::utils::error::StoreError;

pub use repository::{SharedLinkStore, SqliteLinkStore};

/// Result of appending a URL to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was written with this id
    Inserted(i64),
    /// The unique constraint rejected the row; the URL was recorded before
    AlreadyExists,
}

impl AddOutcome {
    /// Whether a new row was written
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Storage capability used by crawl workers
pub trait LinkStore: Send {
    /// Total records, or records for one canonical URL (0 or 1)
    fn count(&self, url: Option<&CanonicalUrl>) -> Result<u64, StoreError>;

    /// Append a record; duplicates come back as [`AddOutcome::AlreadyExists`]
    fn add(&self, url: &CanonicalUrl, snapshot: Option<&str>) -> Result<AddOutcome, StoreError>;

    /// Look up the record for one canonical URL
    fn get(&self, url: &CanonicalUrl) -> Result<Option<StoreRecord>, StoreError>;
}

/// Hands out store handles according to the configured [`StoreHandleMode`]
pub enum StoreProvider {
    /// Every call to [`handle`](Self::handle) opens a fresh connection
    PerWorker {
        path: PathBuf,
        busy_timeout: Duration,
    },
    /// Every handle is a clone of one mutex-guarded connection
    Shared(SharedLinkStore),
}

impl StoreProvider {
    /// Open the database file and ensure the schema exists
    pub fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let path = config.sqlite_path.clone();
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = repository::open_connection(&path, busy_timeout)?;
        repository::ensure_schema(&conn)?;

        tracing::info!(
            path = %path.display(),
            mode = config.handle_mode.as_str(),
            "Link store ready"
        );

        Ok(match config.handle_mode {
            StoreHandleMode::PerWorker => {
                drop(conn);
                Self::PerWorker { path, busy_timeout }
            }
            StoreHandleMode::Shared => Self::Shared(SharedLinkStore::new(conn)),
        })
    }

    /// Shared in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::Shared(SharedLinkStore::in_memory()?))
    }

    /// The handle strategy in use
    pub fn mode(&self) -> StoreHandleMode {
        match self {
            Self::PerWorker { .. } => StoreHandleMode::PerWorker,
            Self::Shared(_) => StoreHandleMode::Shared,
        }
    }

    /// A store handle for exclusive use by one worker
    pub fn handle(&self) -> Result<Box<dyn LinkStore>, StoreError> {
        match self {
            Self::PerWorker { path, busy_timeout } => {
                Ok(Box::new(SqliteLinkStore::open(path, *busy_timeout)?))
            }
            Self::Shared(store) => Ok(Box::new(store.clone())),
        }
    }
}
