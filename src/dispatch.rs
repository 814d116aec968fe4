//! Driver adaptation layer
//!
//! The driver hands every callback a path. The [`Dispatcher`] resolves that
//! path to an [`Entry`] (one kind lookup per call), forwards the callback and
//! flattens the outcome into a [`Status`] plus any output data, which is what
//! a driver binding passes back to the OS.
//!
//! Directory rows are served by a factory registered by the mount; without
//! one, directory callbacks report `NotSupported`.

use crate::db::schema::{EntryKind, COL_KIND};
use crate::db::{Database, StatementFactory};
use crate::entry::Entry;
use crate::error::{Result, SqliteFsError};
use crate::file::File;
use crate::info::{create_options, CreateRequest, FileInfo, FileInformation, FindData};
use crate::status::{OpError, OpResult, Status};
use crate::time::FileTime;
use crate::validation::normalize_path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds the entry for a directory row
pub type DirectoryFactory = Arc<dyn Fn(Arc<Database>, &str) -> Box<dyn Entry> + Send + Sync>;

/// Routes driver callbacks to entries of one mounted store
#[derive(Clone)]
pub struct Dispatcher {
    db: Arc<Database>,
    directories: Option<DirectoryFactory>,
}

fn split<T: Default>(result: OpResult<T>) -> (Status, T) {
    match result {
        Ok(value) => (Status::Success, value),
        Err(e) => (e.into(), T::default()),
    }
}

impl Dispatcher {
    pub fn new(db: Arc<Database>) -> Self {
        Dispatcher {
            db,
            directories: None,
        }
    }

    pub fn with_directory_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(Arc<Database>, &str) -> Box<dyn Entry> + Send + Sync + 'static,
    {
        self.directories = Some(Arc::new(factory));
        self
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    fn kind_of(&self, path: &str) -> Result<Option<EntryKind>> {
        let mut cursor = StatementFactory::new(&self.db).kind_of(path);
        if !cursor.fetch()? {
            return Ok(None);
        }

        let raw = cursor.column(COL_KIND)?.int()?;
        EntryKind::from_i32(raw)
            .map(Some)
            .ok_or_else(|| SqliteFsError::CorruptRow {
                path: path.to_string(),
                reason: format!("unknown kind {}", raw),
            })
    }

    /// Resolve a driver path to its entry
    pub fn open(&self, path: &str) -> OpResult<Box<dyn Entry>> {
        let path = normalize_path(path).map_err(|e| {
            debug!(path, error = %e, "Rejected path");
            OpError::InvalidParameter
        })?;

        let kind = self.kind_of(&path).map_err(|e| {
            warn!(path = %path, error = %e, "Resolution failed, reporting not found");
            OpError::NotFound
        })?;

        match kind {
            Some(EntryKind::File) => Ok(Box::new(File::new(self.db.clone(), path))),
            Some(EntryKind::Directory) => match &self.directories {
                Some(factory) => Ok(factory(self.db.clone(), &path)),
                None => Err(OpError::NotSupported),
            },
            None => Err(OpError::NotFound),
        }
    }

    fn with_entry<T: Default>(
        &self,
        path: &str,
        f: impl FnOnce(&dyn Entry) -> OpResult<T>,
    ) -> (Status, T) {
        split(self.open(path).and_then(|entry| f(entry.as_ref())))
    }

    /// Open or create; on success the handle metadata is filled in
    pub fn create_file(&self, path: &str, request: &CreateRequest, info: &mut FileInfo) -> Status {
        let entry = match self.open(path) {
            Ok(entry) => entry,
            Err(e) => return e.into(),
        };

        let result = entry.create(request, info);
        if result.is_ok() {
            info.is_directory = entry.is_directory();
            if request.create_options & create_options::FILE_DELETE_ON_CLOSE != 0 {
                info.delete_on_close = true;
            }
        }
        Status::from(&result)
    }

    pub fn close_file(&self, path: &str, info: &FileInfo) {
        if let Ok(entry) = self.open(path) {
            entry.close(info);
        }
    }

    pub fn cleanup(&self, path: &str, info: &FileInfo) {
        match self.open(path) {
            Ok(entry) => entry.cleanup(info),
            Err(e) => debug!(path, error = %e, "Nothing to clean up"),
        }
    }

    pub fn read_file(&self, path: &str, buffer: &mut [u8], offset: i64, info: &FileInfo) -> (Status, usize) {
        self.with_entry(path, |entry| entry.read(buffer, offset, info))
    }

    pub fn write_file(&self, path: &str, buffer: &[u8], offset: i64, info: &FileInfo) -> (Status, usize) {
        self.with_entry(path, |entry| entry.write(buffer, offset, info))
    }

    pub fn flush_file_buffers(&self, path: &str, info: &FileInfo) -> Status {
        self.with_entry(path, |entry| entry.flush(info)).0
    }

    pub fn get_file_information(&self, path: &str, info: &FileInfo) -> (Status, FileInformation) {
        self.with_entry(path, |entry| entry.get_information(info))
    }

    pub fn find_files(&self, path: &str, fill: &mut dyn FnMut(FindData), info: &FileInfo) -> Status {
        self.with_entry(path, |entry| entry.find_files(fill, info)).0
    }

    pub fn delete_file(&self, path: &str, info: &FileInfo) -> Status {
        self.with_entry(path, |entry| entry.delete(info)).0
    }

    pub fn delete_directory(&self, path: &str, info: &FileInfo) -> Status {
        self.with_entry(path, |entry| entry.delete_directory(info)).0
    }

    pub fn move_file(&self, path: &str, new_name: &str, replace_if_existing: bool, info: &FileInfo) -> Status {
        self.with_entry(path, |entry| entry.move_to(new_name, replace_if_existing, info))
            .0
    }

    pub fn set_end_of_file(&self, path: &str, offset: i64, info: &FileInfo) -> Status {
        self.with_entry(path, |entry| entry.set_end_of_file(offset, info)).0
    }

    pub fn set_allocation_size(&self, path: &str, size: i64, info: &FileInfo) -> Status {
        self.with_entry(path, |entry| entry.set_allocation_size(size, info)).0
    }

    pub fn set_file_attributes(&self, path: &str, attributes: u32, info: &FileInfo) -> Status {
        self.with_entry(path, |entry| entry.set_attributes(attributes, info)).0
    }

    pub fn set_file_time(
        &self,
        path: &str,
        creation: Option<FileTime>,
        last_access: Option<FileTime>,
        last_write: Option<FileTime>,
        info: &FileInfo,
    ) -> Status {
        self.with_entry(path, |entry| {
            entry.set_file_time(creation, last_access, last_write, info)
        })
        .0
    }

    pub fn get_file_security(
        &self,
        path: &str,
        security_information: u32,
        buffer: &mut [u8],
        info: &FileInfo,
    ) -> (Status, usize) {
        self.with_entry(path, |entry| {
            entry.get_security(security_information, buffer, info)
        })
    }

    pub fn set_file_security(
        &self,
        path: &str,
        security_information: u32,
        descriptor: &[u8],
        info: &FileInfo,
    ) -> Status {
        self.with_entry(path, |entry| {
            entry.set_security(security_information, descriptor, info)
        })
        .0
    }
}
