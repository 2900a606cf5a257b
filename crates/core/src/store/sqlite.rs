//! Persistent substrate backed by a local SQLite file.
//!
//! This is the native stand-in for browser local storage: one flat
//! `local_storage` table of string pairs, an optional byte quota, and the
//! same pragma setup the rest of the stack uses (WAL, NORMAL sync).

use super::migrations;
use super::substrate::Substrate;
use crate::Error;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{Connection, OptionalExtension};

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// SQLite-backed substrate handle.
///
/// The connection sits behind a mutex so one handle can be shared by every
/// `KeyedStore` of a process.
///
/// Every call blocks the calling thread for one short statement; async
/// callers run it inline rather than through `tokio_rusqlite::Connection::call`.
#[derive(Debug)]
pub struct SqliteSubstrate {
    conn: Mutex<Connection>,
    quota: Option<usize>,
}

impl SqliteSubstrate {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas, and runs any
    /// pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::StorageUnavailable(format!("cannot create {}: {e}", parent.display())))?;
        }

        let conn = Connection::open(path)?;
        Self::prepare(conn)
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(conn)
    }

    fn prepare(conn: Connection) -> Result<Self, Error> {
        conn.execute_batch(PRAGMAS)?;
        migrations::run(&conn)?;
        Ok(Self { conn: Mutex::new(conn), quota: None })
    }

    /// Cap total stored bytes (key + value) like a browser origin quota.
    pub fn with_quota(mut self, bytes: Option<usize>) -> Self {
        self.quota = bytes;
        self
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Substrate for SqliteSubstrate {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let conn = self.conn();
        let value = conn
            .query_row("SELECT value FROM local_storage WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let conn = self.conn();

        if let Some(limit) = self.quota {
            let used: i64 = conn.query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
                 FROM local_storage WHERE key != ?1",
                params![key],
                |row| row.get(0),
            )?;
            let requested = usize::try_from(used).unwrap_or(usize::MAX) + key.len() + value.len();
            if requested > limit {
                return Err(Error::QuotaExceeded { requested, limit });
            }
        }

        conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        self.conn()
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, Error> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT key FROM local_storage ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}
