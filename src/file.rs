//! Blob-backed file entry
//!
//! Serves the driver callbacks for a leaf node by issuing one statement per
//! call through the [`StatementFactory`] and translating the outcome into an
//! [`OpResult`]. Content is read-only: writes, resizes, renames, attribute
//! and time changes, and security queries all report `NotSupported`.
//!
//! Store failures never cross the callback boundary. They are logged and
//! reported as `NotFound` (fail closed).

use crate::db::schema::{COL_ATIME, COL_BLOB, COL_CTIME, COL_MTIME, COL_SIZE};
use crate::db::{Database, RowCursor, StatementFactory};
use crate::entry::{Entry, EntryBase};
use crate::error::{Result, SqliteFsError};
use crate::info::{attributes, CreateRequest, FileInfo, FileInformation, FindData};
use crate::status::{OpError, OpResult};
use crate::time::FileTime;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Leaf node whose content is the `blob` column of its row
#[derive(Debug, Clone)]
pub struct File {
    base: EntryBase,
}

impl File {
    pub fn new(db: Arc<Database>, path: impl Into<String>) -> Self {
        File {
            base: EntryBase::new(db, path),
        }
    }

    fn statements(&self) -> StatementFactory<'_> {
        StatementFactory::new(self.base.database())
    }

    /// Log a store failure and fail closed
    fn store_failure(&self, op: &'static str, err: SqliteFsError) -> OpError {
        warn!(path = self.path(), op, error = %err, "Store failure, reporting not found");
        OpError::NotFound
    }

    fn unsupported(&self, op: &'static str) -> OpError {
        debug!(path = self.path(), op, "Unsupported operation");
        OpError::NotSupported
    }

    /// Fetch this file's row, or `Ok(None)` if there is none
    fn lookup(&self) -> Result<Option<RowCursor<'_>>> {
        let mut cursor = self.statements().find_by_name(self.path());
        Ok(cursor.fetch()?.then_some(cursor))
    }
}

/// Blob of a fetched row, checked against its stored size
fn checked_blob<'c>(cursor: &'c RowCursor<'_>) -> Result<&'c [u8]> {
    let blob = cursor.column(COL_BLOB)?.blob()?;
    let size = cursor.column(COL_SIZE)?.int64()?;

    if u64::try_from(size).ok() != Some(blob.len() as u64) {
        return Err(SqliteFsError::CorruptRow {
            path: cursor.path().to_string(),
            reason: format!("size {} does not match blob length {}", size, blob.len()),
        });
    }

    Ok(blob)
}

/// Copy `content[offset..]` into `buffer`; an offset at or past the end reads nothing
fn copy_window(content: &[u8], buffer: &mut [u8], offset: u64) -> usize {
    let start = match usize::try_from(offset) {
        Ok(start) if start < content.len() => start,
        _ => return 0,
    };

    let n = buffer.len().min(content.len() - start);
    buffer[..n].copy_from_slice(&content[start..start + n]);
    n
}

/// NULL timestamps report as the zero file time
fn time_column(cursor: &RowCursor<'_>, name: &str) -> Result<FileTime> {
    let column = cursor.column(name)?;
    if column.is_null() {
        return Ok(FileTime::default());
    }
    Ok(FileTime::from_unix(column.int64()?))
}

fn file_information(cursor: &RowCursor<'_>) -> Result<FileInformation> {
    let size = checked_blob(cursor)?.len() as u64;

    let mut out = FileInformation {
        attributes: attributes::FILE_ATTRIBUTE_NORMAL,
        creation_time: time_column(cursor, COL_CTIME)?,
        last_access_time: time_column(cursor, COL_ATIME)?,
        last_write_time: time_column(cursor, COL_MTIME)?,
        number_of_links: 1,
        ..FileInformation::default()
    };
    out.set_file_size(size);
    Ok(out)
}

impl Entry for File {
    fn base(&self) -> &EntryBase {
        &self.base
    }

    /// A file handle is only built for a path resolution already found
    fn exists(&self) -> bool {
        true
    }

    fn is_directory(&self) -> bool {
        false
    }

    fn is_file(&self) -> bool {
        true
    }

    fn create(&self, request: &CreateRequest, info: &FileInfo) -> OpResult<()> {
        debug!(path = self.path(), disposition = ?request.disposition, "create");

        if request.directory_only() || info.is_directory {
            return Err(OpError::NotADirectory);
        }
        // Never overwrite an existing row implicitly
        if request.disposition.may_overwrite() {
            return Err(OpError::NameCollision);
        }
        Ok(())
    }

    fn close(&self, _info: &FileInfo) {}

    fn cleanup(&self, info: &FileInfo) {
        if !info.delete_on_close || info.is_directory {
            return;
        }

        match self.statements().remove(self.path()).execute() {
            Ok(rows) => info!(path = self.path(), rows, "Deleted on cleanup"),
            Err(e) => warn!(path = self.path(), error = %e, "Delete on cleanup failed"),
        }
    }

    fn read(&self, buffer: &mut [u8], offset: i64, _info: &FileInfo) -> OpResult<usize> {
        debug!(path = self.path(), offset, len = buffer.len(), "read");

        let offset = u64::try_from(offset).map_err(|_| OpError::InvalidParameter)?;

        let cursor = self
            .lookup()
            .map_err(|e| self.store_failure("read", e))?
            .ok_or(OpError::NotFound)?;
        let content = checked_blob(&cursor).map_err(|e| self.store_failure("read", e))?;

        Ok(copy_window(content, buffer, offset))
    }

    fn write(&self, _buffer: &[u8], _offset: i64, _info: &FileInfo) -> OpResult<usize> {
        Err(self.unsupported("write"))
    }

    fn flush(&self, _info: &FileInfo) -> OpResult<()> {
        Ok(())
    }

    fn get_information(&self, _info: &FileInfo) -> OpResult<FileInformation> {
        debug!(path = self.path(), "get_information");

        let cursor = self
            .lookup()
            .map_err(|e| self.store_failure("get_information", e))?
            .ok_or(OpError::NotFound)?;

        file_information(&cursor).map_err(|e| self.store_failure("get_information", e))
    }

    fn find_files(&self, _fill: &mut dyn FnMut(FindData), _info: &FileInfo) -> OpResult<()> {
        Err(OpError::NotADirectory)
    }

    fn delete(&self, _info: &FileInfo) -> OpResult<()> {
        Ok(())
    }

    fn delete_directory(&self, info: &FileInfo) -> OpResult<()> {
        if info.delete_on_close {
            return Err(OpError::AccessDenied);
        }
        Ok(())
    }

    fn move_to(&self, _new_name: &str, _replace_if_existing: bool, _info: &FileInfo) -> OpResult<()> {
        Err(self.unsupported("move"))
    }

    fn set_end_of_file(&self, _offset: i64, _info: &FileInfo) -> OpResult<()> {
        Err(self.unsupported("set_end_of_file"))
    }

    fn set_allocation_size(&self, _size: i64, _info: &FileInfo) -> OpResult<()> {
        Err(self.unsupported("set_allocation_size"))
    }

    fn set_attributes(&self, _attributes: u32, _info: &FileInfo) -> OpResult<()> {
        Err(self.unsupported("set_attributes"))
    }

    fn set_file_time(
        &self,
        _creation: Option<FileTime>,
        _last_access: Option<FileTime>,
        _last_write: Option<FileTime>,
        _info: &FileInfo,
    ) -> OpResult<()> {
        Err(self.unsupported("set_file_time"))
    }

    fn get_security(
        &self,
        _security_information: u32,
        _buffer: &mut [u8],
        _info: &FileInfo,
    ) -> OpResult<usize> {
        Err(self.unsupported("get_security"))
    }

    fn set_security(
        &self,
        _security_information: u32,
        _descriptor: &[u8],
        _info: &FileInfo,
    ) -> OpResult<()> {
        Err(self.unsupported("set_security"))
    }
}
