//! Error types for store and configuration operations

use thiserror::Error;

/// Store-level result type
pub type Result<T> = std::result::Result<T, SqliteFsError>;

/// Errors raised below the callback boundary
///
/// None of these ever reach the driver: the file layer downgrades them to a
/// [`Status`](crate::status::Status) before returning.
#[derive(Error, Debug)]
pub enum SqliteFsError {
    /// Underlying SQLite failure (I/O, locking, corruption)
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Column read while the cursor is not positioned on a fetched row
    #[error("Cursor is not positioned on a row")]
    CursorNotPositioned,

    #[error("No such column: {0}")]
    NoSuchColumn(String),

    #[error("Column '{column}' is not of type {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// Row violates a stored-entry invariant
    #[error("Corrupt row for '{path}': {reason}")]
    CorruptRow { path: String, reason: String },
}
