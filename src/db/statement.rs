//! Statement Factory and Row Cursor
//!
//! Keeps statement text out of the file layer. The factory turns a logical
//! path-keyed operation into a prepared, parameterized statement; lookups
//! come back as a forward-only [`RowCursor`] over at most one row.

use super::schema;
use super::Database;
use crate::error::{Result, SqliteFsError};
use rusqlite::params;
use rusqlite::types::Value;

/// Builds path-keyed statements against one store
pub struct StatementFactory<'db> {
    db: &'db Database,
}

impl<'db> StatementFactory<'db> {
    pub fn new(db: &'db Database) -> Self {
        StatementFactory { db }
    }

    /// Lookup of the full row for `path`
    pub fn find_by_name(&self, path: &str) -> RowCursor<'db> {
        RowCursor::new(self.db, schema::select_by_path_sql(self.db.table()), path)
    }

    /// Lookup of only the kind discriminator for `path`
    pub fn kind_of(&self, path: &str) -> RowCursor<'db> {
        RowCursor::new(self.db, schema::select_kind_sql(self.db.table()), path)
    }

    /// Deletion of the row for `path`
    pub fn remove(&self, path: &str) -> Statement<'db> {
        Statement {
            db: self.db,
            sql: schema::delete_by_path_sql(self.db.table()),
            path: path.to_string(),
        }
    }
}

/// Statement that produces no rows
pub struct Statement<'db> {
    db: &'db Database,
    sql: String,
    path: String,
}

impl Statement<'_> {
    /// Execute once and return the number of affected rows
    pub fn execute(self) -> Result<usize> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(&self.sql)?;
            let affected = stmt.execute(params![self.path])?;
            Ok(affected)
        })
    }
}

enum CursorState {
    /// Not executed yet
    Pending,
    OnRow(Row),
    Exhausted,
}

struct Row {
    columns: Vec<(String, Value)>,
}

/// Forward-only cursor over at most one matched row
///
/// The statement runs on the first [`fetch`](RowCursor::fetch); the matched
/// row is held only until the cursor is dropped.
pub struct RowCursor<'db> {
    db: &'db Database,
    sql: String,
    path: String,
    state: CursorState,
}

impl<'db> RowCursor<'db> {
    fn new(db: &'db Database, sql: String, path: &str) -> Self {
        RowCursor {
            db,
            sql,
            path: path.to_string(),
            state: CursorState::Pending,
        }
    }

    /// Advance the cursor
    ///
    /// Returns `true` if a row was produced. Paths are unique, so only the
    /// first call can ever return `true`.
    pub fn fetch(&mut self) -> Result<bool> {
        match std::mem::replace(&mut self.state, CursorState::Exhausted) {
            CursorState::Pending => {
                let row = self.db.with_connection(|conn| {
                    let mut stmt = conn.prepare_cached(&self.sql)?;
                    let names: Vec<String> =
                        stmt.column_names().into_iter().map(String::from).collect();
                    let mut rows = stmt.query(params![self.path])?;

                    let row = match rows.next()? {
                        Some(r) => {
                            let mut columns = Vec::with_capacity(names.len());
                            for (i, name) in names.into_iter().enumerate() {
                                columns.push((name, Value::from(r.get_ref(i)?)));
                            }
                            Some(Row { columns })
                        }
                        None => None,
                    };
                    Ok(row)
                })?;

                match row {
                    Some(row) => {
                        self.state = CursorState::OnRow(row);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            CursorState::OnRow(_) | CursorState::Exhausted => Ok(false),
        }
    }

    /// Typed accessor for a column of the current row
    pub fn column(&self, name: &str) -> Result<Column<'_>> {
        let row = match &self.state {
            CursorState::OnRow(row) => row,
            _ => return Err(SqliteFsError::CursorNotPositioned),
        };

        row.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(name, value)| Column {
                name: name.as_str(),
                value,
            })
            .ok_or_else(|| SqliteFsError::NoSuchColumn(name.to_string()))
    }

    /// Path this cursor is keyed on
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// One column of a fetched row
pub struct Column<'c> {
    name: &'c str,
    value: &'c Value,
}

impl<'c> Column<'c> {
    /// Column bytes; NULL reads as empty, TEXT as its UTF-8 bytes
    pub fn blob(&self) -> Result<&'c [u8]> {
        match self.value {
            Value::Blob(b) => Ok(b.as_slice()),
            Value::Text(s) => Ok(s.as_bytes()),
            Value::Null => Ok(&[]),
            _ => Err(self.type_error("BLOB")),
        }
    }

    /// 32-bit integer; values outside `i32` are a type error
    pub fn int(&self) -> Result<i32> {
        match self.value {
            Value::Integer(i) => {
                i32::try_from(*i).map_err(|_| self.type_error("INTEGER (32-bit)"))
            }
            _ => Err(self.type_error("INTEGER (32-bit)")),
        }
    }

    pub fn int64(&self) -> Result<i64> {
        match self.value {
            Value::Integer(i) => Ok(*i),
            _ => Err(self.type_error("INTEGER")),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }

    pub fn name(&self) -> &str {
        self.name
    }

    fn type_error(&self, expected: &'static str) -> SqliteFsError {
        SqliteFsError::ColumnType {
            column: self.name.to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{EntryKind, Timestamps};

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_file("/a.txt", b"hello world", Timestamps::at(1_000))
            .unwrap();
        db.insert_directory("/docs", Timestamps::at(2_000)).unwrap();
        db
    }

    #[test]
    fn test_find_by_name() {
        let db = seeded();
        let mut cursor = StatementFactory::new(&db).find_by_name("/a.txt");

        assert!(cursor.fetch().unwrap());
        assert_eq!(cursor.column("blob").unwrap().blob().unwrap(), b"hello world");
        assert_eq!(cursor.column("size").unwrap().int().unwrap(), 11);
        assert_eq!(cursor.column("size").unwrap().int64().unwrap(), 11);
        assert_eq!(cursor.column("ctime").unwrap().int64().unwrap(), 1_000);
        assert_eq!(
            cursor.column("kind").unwrap().int().unwrap(),
            EntryKind::File.as_i32()
        );

        // Forward-only: no second row
        assert!(!cursor.fetch().unwrap());
        assert!(matches!(
            cursor.column("blob"),
            Err(SqliteFsError::CursorNotPositioned)
        ));
    }

    #[test]
    fn test_find_missing() {
        let db = seeded();
        let mut cursor = StatementFactory::new(&db).find_by_name("/missing");

        assert!(!cursor.fetch().unwrap());
        assert!(matches!(
            cursor.column("blob"),
            Err(SqliteFsError::CursorNotPositioned)
        ));
    }

    #[test]
    fn test_column_before_fetch() {
        let db = seeded();
        let cursor = StatementFactory::new(&db).find_by_name("/a.txt");
        assert!(matches!(
            cursor.column("size"),
            Err(SqliteFsError::CursorNotPositioned)
        ));
    }

    #[test]
    fn test_unknown_column_and_type_mismatch() {
        let db = seeded();
        let mut cursor = StatementFactory::new(&db).find_by_name("/a.txt");
        assert!(cursor.fetch().unwrap());

        assert!(matches!(
            cursor.column("owner"),
            Err(SqliteFsError::NoSuchColumn(_))
        ));
        assert!(matches!(
            cursor.column("blob").unwrap().int64(),
            Err(SqliteFsError::ColumnType { .. })
        ));
    }

    #[test]
    fn test_kind_of() {
        let db = seeded();
        let factory = StatementFactory::new(&db);

        let mut cursor = factory.kind_of("/docs");
        assert!(cursor.fetch().unwrap());
        assert_eq!(
            cursor.column("kind").unwrap().int().unwrap(),
            EntryKind::Directory.as_i32()
        );
        assert!(cursor.column("blob").is_err());
    }

    #[test]
    fn test_remove() {
        let db = seeded();
        let factory = StatementFactory::new(&db);

        assert_eq!(factory.remove("/a.txt").execute().unwrap(), 1);
        assert_eq!(factory.remove("/a.txt").execute().unwrap(), 0);

        let mut cursor = factory.find_by_name("/a.txt");
        assert!(!cursor.fetch().unwrap());
        assert_eq!(db.count().unwrap(), 1);
    }
}
