//! Persisted schema for stored entry rows
//!
//! One row per filesystem path:
//!
//! ```text
//! path   TEXT PRIMARY KEY   full path, '/'-separated
//! blob   BLOB NOT NULL      file content
//! size   INTEGER NOT NULL   byte length of blob (files)
//! ctime  INTEGER NOT NULL   creation time, Unix epoch seconds
//! atime  INTEGER NOT NULL   last access
//! mtime  INTEGER NOT NULL   last write
//! kind   INTEGER NOT NULL   0 = file, 1 = directory
//! ```
//!
//! The table name is configurable and validated; everything else is bound
//! as a statement parameter.

use crate::time::now_unix;
use crate::validation::TableName;

pub const COL_PATH: &str = "path";
pub const COL_BLOB: &str = "blob";
pub const COL_SIZE: &str = "size";
pub const COL_CTIME: &str = "ctime";
pub const COL_ATIME: &str = "atime";
pub const COL_MTIME: &str = "mtime";
pub const COL_KIND: &str = "kind";

/// Row kind discriminator
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File = 0,
    Directory = 1,
}

impl EntryKind {
    /// Parse the stored discriminator
    ///
    /// Unknown values are not guessed at: callers treat them as corrupt rows.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::File),
            1 => Some(Self::Directory),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Creation, access and write times (Unix epoch seconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamps {
    pub ctime: i64,
    pub atime: i64,
    pub mtime: i64,
}

impl Timestamps {
    /// All three times set to `secs`
    pub fn at(secs: i64) -> Self {
        Timestamps {
            ctime: secs,
            atime: secs,
            mtime: secs,
        }
    }

    pub fn now() -> Self {
        Self::at(now_unix())
    }
}

pub fn create_table_sql(table: &TableName) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS \"{table}\" (
            {COL_PATH}  TEXT PRIMARY KEY NOT NULL,
            {COL_BLOB}  BLOB NOT NULL DEFAULT x'',
            {COL_SIZE}  INTEGER NOT NULL DEFAULT 0,
            {COL_CTIME} INTEGER NOT NULL DEFAULT 0,
            {COL_ATIME} INTEGER NOT NULL DEFAULT 0,
            {COL_MTIME} INTEGER NOT NULL DEFAULT 0,
            {COL_KIND}  INTEGER NOT NULL DEFAULT 0
        )"
    )
}

pub(crate) fn select_by_path_sql(table: &TableName) -> String {
    format!(
        "SELECT {COL_PATH}, {COL_BLOB}, {COL_SIZE}, {COL_CTIME}, {COL_ATIME}, {COL_MTIME}, {COL_KIND} \
         FROM \"{table}\" WHERE {COL_PATH} = ?1"
    )
}

pub(crate) fn select_kind_sql(table: &TableName) -> String {
    format!("SELECT {COL_KIND} FROM \"{table}\" WHERE {COL_PATH} = ?1")
}

pub(crate) fn delete_by_path_sql(table: &TableName) -> String {
    format!("DELETE FROM \"{table}\" WHERE {COL_PATH} = ?1")
}

pub(crate) fn insert_sql(table: &TableName) -> String {
    format!(
        "INSERT INTO \"{table}\" ({COL_PATH}, {COL_BLOB}, {COL_SIZE}, {COL_CTIME}, {COL_ATIME}, {COL_MTIME}, {COL_KIND}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
    )
}

pub(crate) fn count_sql(table: &TableName) -> String {
    format!("SELECT COUNT(*) FROM \"{table}\"")
}
