//! Filesystem node capability set
//!
//! An [`Entry`] is bound to one store and one path key. It answers the
//! identity questions (`exists` / `is_file` / `is_directory`) and serves the
//! full driver callback surface. Concrete variants are [`File`](crate::File)
//! and whatever directory implementation the mount registers with the
//! [`Dispatcher`](crate::Dispatcher).
//!
//! Entries are transient and stateless: every callback re-reads the row it
//! needs, so two callbacks on the same path never share cached row data.

use crate::db::Database;
use crate::info::{CreateRequest, FileInfo, FileInformation, FindData};
use crate::status::{OpError, OpResult};
use crate::time::FileTime;
use std::sync::Arc;

/// Store handle and path key shared by every entry variant
#[derive(Clone)]
pub struct EntryBase {
    db: Arc<Database>,
    path: String,
}

impl EntryBase {
    pub fn new(db: Arc<Database>, path: impl Into<String>) -> Self {
        EntryBase {
            db,
            path: path.into(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for EntryBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryBase")
            .field("path", &self.path)
            .field("table", self.db.table())
            .finish()
    }
}

/// Polymorphic filesystem node
///
/// Mutating callbacks default to [`OpError::NotSupported`]: the store is
/// read-only through this interface.
pub trait Entry: Send + Sync {
    fn base(&self) -> &EntryBase;

    fn path(&self) -> &str {
        self.base().path()
    }

    fn exists(&self) -> bool;
    fn is_directory(&self) -> bool;
    fn is_file(&self) -> bool;

    fn create(&self, request: &CreateRequest, info: &FileInfo) -> OpResult<()>;

    /// Last handle closed; no status is reported
    fn close(&self, info: &FileInfo);

    /// Last handle cleaned up; deferred deletion happens here
    fn cleanup(&self, info: &FileInfo);

    /// Copy content at `offset` into `buffer`, returning the bytes read
    fn read(&self, buffer: &mut [u8], offset: i64, info: &FileInfo) -> OpResult<usize>;

    fn write(&self, _buffer: &[u8], _offset: i64, _info: &FileInfo) -> OpResult<usize> {
        Err(OpError::NotSupported)
    }

    fn flush(&self, info: &FileInfo) -> OpResult<()>;

    fn get_information(&self, info: &FileInfo) -> OpResult<FileInformation>;

    fn find_files(&self, fill: &mut dyn FnMut(FindData), info: &FileInfo) -> OpResult<()>;

    /// May this entry be deleted? Removal itself is deferred to cleanup.
    fn delete(&self, info: &FileInfo) -> OpResult<()>;

    fn delete_directory(&self, info: &FileInfo) -> OpResult<()>;

    fn move_to(&self, _new_name: &str, _replace_if_existing: bool, _info: &FileInfo) -> OpResult<()> {
        Err(OpError::NotSupported)
    }

    fn set_end_of_file(&self, _offset: i64, _info: &FileInfo) -> OpResult<()> {
        Err(OpError::NotSupported)
    }

    fn set_allocation_size(&self, _size: i64, _info: &FileInfo) -> OpResult<()> {
        Err(OpError::NotSupported)
    }

    fn set_attributes(&self, _attributes: u32, _info: &FileInfo) -> OpResult<()> {
        Err(OpError::NotSupported)
    }

    fn set_file_time(
        &self,
        _creation: Option<FileTime>,
        _last_access: Option<FileTime>,
        _last_write: Option<FileTime>,
        _info: &FileInfo,
    ) -> OpResult<()> {
        Err(OpError::NotSupported)
    }

    /// Security descriptors are never served
    fn get_security(
        &self,
        _security_information: u32,
        _buffer: &mut [u8],
        _info: &FileInfo,
    ) -> OpResult<usize> {
        Err(OpError::NotSupported)
    }

    fn set_security(
        &self,
        _security_information: u32,
        _descriptor: &[u8],
        _info: &FileInfo,
    ) -> OpResult<()> {
        Err(OpError::NotSupported)
    }
}
