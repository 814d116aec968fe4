//! Store handle
//!
//! A [`Database`] owns one SQLite connection behind a mutex and is shared by
//! every entry of a mount as `Arc<Database>`. Each statement holds the lock
//! for exactly one execution; that lock is the serialization point between
//! concurrent callbacks, so a lookup sees either the whole row or no row.

pub mod schema;
pub mod statement;

use crate::config::StoreConfig;
use crate::error::{Result, SqliteFsError};
use crate::validation::TableName;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags};
use schema::{EntryKind, Timestamps};
use tracing::{debug, info};

pub use statement::{Column, RowCursor, Statement, StatementFactory};

/// Shared SQLite store for one mount
pub struct Database {
    conn: Mutex<Connection>,
    table: TableName,
}

impl Database {
    /// Open a store described by `config`
    ///
    /// File-backed stores are used as found: the schema is owned by whoever
    /// populated the database. In-memory stores get the schema created.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let db = match &config.path {
            Some(path) => {
                let flags = if config.read_only {
                    OpenFlags::SQLITE_OPEN_READ_ONLY
                        | OpenFlags::SQLITE_OPEN_URI
                        | OpenFlags::SQLITE_OPEN_NO_MUTEX
                } else {
                    OpenFlags::SQLITE_OPEN_READ_WRITE
                        | OpenFlags::SQLITE_OPEN_CREATE
                        | OpenFlags::SQLITE_OPEN_URI
                        | OpenFlags::SQLITE_OPEN_NO_MUTEX
                };
                let conn = Connection::open_with_flags(path, flags)?;
                conn.busy_timeout(config.busy_timeout())?;

                info!(
                    path = %path.display(),
                    table = %config.table,
                    read_only = config.read_only,
                    "Opened store"
                );

                Database {
                    conn: Mutex::new(conn),
                    table: config.table.clone(),
                }
            }
            None => {
                let db = Database {
                    conn: Mutex::new(Connection::open_in_memory()?),
                    table: config.table.clone(),
                };
                db.ensure_schema()?;
                debug!(table = %config.table, "Opened in-memory store");
                db
            }
        };

        Ok(db)
    }

    /// Private in-memory store with the default table
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&StoreConfig::default())
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Run `f` with exclusive use of the connection
    pub(crate) fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn).map_err(SqliteFsError::from)
    }

    /// Create the entry table if it does not exist
    pub fn ensure_schema(&self) -> Result<()> {
        let sql = schema::create_table_sql(&self.table);
        self.with_connection(|conn| conn.execute_batch(&sql))
    }

    /// Insert a file row
    ///
    /// This is the external creation path; the filesystem callbacks never
    /// insert. Fails if `path` already has a row.
    pub fn insert_file(&self, path: &str, blob: &[u8], times: Timestamps) -> Result<()> {
        self.insert(path, blob, times, EntryKind::File)
    }

    /// Insert a directory row (empty blob, size 0)
    pub fn insert_directory(&self, path: &str, times: Timestamps) -> Result<()> {
        self.insert(path, &[], times, EntryKind::Directory)
    }

    fn insert(&self, path: &str, blob: &[u8], times: Timestamps, kind: EntryKind) -> Result<()> {
        let sql = schema::insert_sql(&self.table);
        let size = blob.len() as i64;

        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            stmt.execute(params![
                path,
                blob,
                size,
                times.ctime,
                times.atime,
                times.mtime,
                kind.as_i32()
            ])?;
            Ok(())
        })?;

        debug!(path, size, ?kind, "Inserted entry row");
        Ok(())
    }

    /// Number of rows in the entry table
    pub fn count(&self) -> Result<u64> {
        let sql = schema::count_sql(&self.table);
        let count: i64 = self.with_connection(|conn| conn.query_row(&sql, [], |row| row.get(0)))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_has_schema() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.count().unwrap(), 0);
        assert_eq!(db.table().as_str(), "entries");
    }

    #[test]
    fn test_insert_and_count() {
        let db = Database::open_in_memory().unwrap();
        db.insert_file("/a.txt", b"abc", Timestamps::at(1)).unwrap();
        db.insert_directory("/d", Timestamps::at(1)).unwrap();
        assert_eq!(db.count().unwrap(), 2);
    }

    #[test]
    fn test_path_is_unique() {
        let db = Database::open_in_memory().unwrap();
        db.insert_file("/a.txt", b"abc", Timestamps::at(1)).unwrap();
        assert!(matches!(
            db.insert_file("/a.txt", b"other", Timestamps::at(2)),
            Err(SqliteFsError::Store(_))
        ));
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_file_backed_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("files.db");

        let config = StoreConfig {
            path: Some(path.clone()),
            ..StoreConfig::default()
        };

        {
            let db = Database::open(&config).unwrap();
            db.ensure_schema().unwrap();
            db.insert_file("/persisted.bin", &[1, 2, 3], Timestamps::at(5))
                .unwrap();
        }

        let read_only = StoreConfig {
            read_only: true,
            ..config
        };
        let db = Database::open(&read_only).unwrap();
        assert_eq!(db.count().unwrap(), 1);
        assert!(db.insert_file("/new", b"x", Timestamps::at(6)).is_err());
    }

    #[test]
    fn test_custom_table() {
        let config = StoreConfig {
            table: TableName::new("blobs").unwrap(),
            ..StoreConfig::default()
        };
        let db = Database::open(&config).unwrap();
        db.insert_file("/x", b"1", Timestamps::at(0)).unwrap();
        assert_eq!(db.count().unwrap(), 1);
    }
}
