//! SQLite-backed key-value slot.
//!
//! Chronos keeps its whole state in two keys: the serialized event list and
//! the selected theme. The table is a plain `key -> text` map.
//!
//! Several `chronos` processes may share one file. Read-modify-write cycles
//! go through [`Database::begin`], which takes SQLite's write lock up front.

use std::path::Path;

use rusqlite::{params, Connection, Transaction, TransactionBehavior};

use super::data_dir;
use crate::error::StorageError;

/// SQLite database holding the kv table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/chronos.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join("chronos.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and previews).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        kv_get_on(&self.conn, key)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        kv_set_on(&self.conn, key, value)
    }

    /// Start an immediate transaction. Other writers block (up to the busy
    /// timeout) until it is committed or dropped. Dropping rolls back.
    pub fn begin(&self) -> Result<KvTransaction<'_>, StorageError> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        Ok(KvTransaction { tx })
    }
}

/// Exclusive read-modify-write access to the kv table.
pub struct KvTransaction<'a> {
    tx: Transaction<'a>,
}

impl KvTransaction<'_> {
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        kv_get_on(&self.tx, key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        kv_set_on(&self.tx, key, value)
    }

    pub fn commit(self) -> Result<(), StorageError> {
        self.tx.commit()?;
        Ok(())
    }
}

fn kv_get_on(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn kv_set_on(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}
