//! SQLite-backed link store
//!
//! Two handle flavours share the same queries:
//!
//! - [`SqliteLinkStore`] owns its connection. Give each worker its own; WAL
//!   mode and a busy timeout let SQLite serialize the writers.
//! - [`SharedLinkStore`] wraps one connection in `Arc<Mutex<_>>`; clones are
//!   cheap and every call holds the lock for a single statement.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{ffi, params, Connection, OptionalExtension};

use super::{AddOutcome, LinkStore};
use crate::models::{CanonicalUrl, StoreRecord};
use crate::utils::error::StoreError;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS links (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        canonical_url TEXT NOT NULL UNIQUE,
        snapshot TEXT
    );
"#;

/// Open a connection configured for concurrent writers
pub(crate) fn open_connection(path: &Path, busy_timeout: Duration) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    Ok(conn)
}

/// Create the `links` table if it does not exist yet
pub(crate) fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn count_links(conn: &Connection, url: Option<&CanonicalUrl>) -> Result<u64, StoreError> {
    let count: i64 = match url {
        Some(url) => conn.query_row(
            "SELECT COUNT(*) FROM links WHERE canonical_url = ?1",
            params![url.as_str()],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?,
    };

    Ok(u64::try_from(count).unwrap_or_default())
}

fn insert_link(
    conn: &Connection,
    url: &CanonicalUrl,
    snapshot: Option<&str>,
) -> Result<AddOutcome, StoreError> {
    let result = conn.execute(
        "INSERT INTO links (canonical_url, snapshot) VALUES (?1, ?2)",
        params![url.as_str(), snapshot],
    );

    match result {
        Ok(_) => Ok(AddOutcome::Inserted(conn.last_insert_rowid())),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Ok(AddOutcome::AlreadyExists)
        }
        Err(e) => Err(e.into()),
    }
}

fn find_link(conn: &Connection, url: &CanonicalUrl) -> Result<Option<StoreRecord>, StoreError> {
    let record = conn
        .query_row(
            "SELECT id, canonical_url, snapshot FROM links WHERE canonical_url = ?1",
            params![url.as_str()],
            |row| {
                Ok(StoreRecord {
                    id: row.get(0)?,
                    canonical_url: row.get(1)?,
                    snapshot: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(record)
}

/// Link store handle that owns its connection
pub struct SqliteLinkStore {
    conn: Connection,
}

impl SqliteLinkStore {
    /// Open a handle on an existing database file
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, StoreError> {
        let conn = open_connection(path.as_ref(), busy_timeout)?;
        Ok(Self { conn })
    }

    /// Create in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl LinkStore for SqliteLinkStore {
    fn count(&self, url: Option<&CanonicalUrl>) -> Result<u64, StoreError> {
        count_links(&self.conn, url)
    }

    fn add(&self, url: &CanonicalUrl, snapshot: Option<&str>) -> Result<AddOutcome, StoreError> {
        insert_link(&self.conn, url, snapshot)
    }

    fn get(&self, url: &CanonicalUrl) -> Result<Option<StoreRecord>, StoreError> {
        find_link(&self.conn, url)
    }
}

/// Link store handle over one connection shared by every clone
#[derive(Clone)]
pub struct SharedLinkStore {
    conn: Arc<Mutex<Connection>>,
}

impl SharedLinkStore {
    /// Wrap an already configured connection
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Create in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        ensure_schema(&conn)?;
        Ok(Self::new(conn))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LinkStore for SharedLinkStore {
    fn count(&self, url: Option<&CanonicalUrl>) -> Result<u64, StoreError> {
        count_links(&self.lock(), url)
    }

    fn add(&self, url: &CanonicalUrl, snapshot: Option<&str>) -> Result<AddOutcome, StoreError> {
        insert_link(&self.lock(), url, snapshot)
    }

    fn get(&self, url: &CanonicalUrl) -> Result<Option<StoreRecord>, StoreError> {
        find_link(&self.lock(), url)
    }
}
