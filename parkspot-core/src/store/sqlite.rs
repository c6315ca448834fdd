//! SQLite key-value backend.
//!
//! Values live in a single `kv(key, value)` table. The connection sits behind
//! a mutex because `rusqlite::Connection` is not `Sync`; every statement is
//! short and runs to completion before the lock is released.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use super::{KeyValueError, KeyValueStore};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";
const SELECT_VALUE: &str = "SELECT value FROM kv WHERE key = ?1";
const UPSERT_VALUE: &str = "INSERT INTO kv (key, value) VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// Error raised while opening a [`SqliteKeyValueStore`].
#[derive(Debug, Error)]
pub enum SqliteKeyValueStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the key-value table failed.
    #[error("failed to prepare key-value schema: {source}")]
    Schema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// [`KeyValueStore`] persisted in a SQLite database.
#[derive(Debug)]
pub struct SqliteKeyValueStore {
    connection: Mutex<Connection>,
}

impl SqliteKeyValueStore {
    /// Open (or create) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteKeyValueStoreError> {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteKeyValueStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Self::with_connection(connection)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, SqliteKeyValueStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| {
            SqliteKeyValueStoreError::OpenDatabase {
                path: PathBuf::from(":memory:"),
                source,
            }
        })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, SqliteKeyValueStoreError> {
        connection
            .execute(CREATE_TABLE, [])
            .map_err(|source| SqliteKeyValueStoreError::Schema { source })?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| KeyValueError::read(key, "SQLite connection lock poisoned"))?;
        connection
            .query_row(SELECT_VALUE, params![key], |row| row.get::<_, String>(0))
            .optional()
            .map_err(|source| KeyValueError::read(key, source))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KeyValueError> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| KeyValueError::write(key, "SQLite connection lock poisoned"))?;
        connection
            .execute(UPSERT_VALUE, params![key, value])
            .map(|_| ())
            .map_err(|source| KeyValueError::write(key, source))
    }
}
