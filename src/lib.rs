//! # sqlitefs - Filesystem Callbacks over a SQLite Table
//!
//! `sqlitefs` serves the callbacks of a user-mode filesystem driver from a
//! relational store: every path is one row of a table, a file's content is
//! the row's `blob` column, and each callback becomes one parameterized
//! statement against that table.
//!
//! - **Read-only content**: files can be opened, read, stat'ed and deleted;
//!   writes, renames, resizes and metadata changes report `NotSupported`
//! - **Stateless entries**: every callback re-reads its row, so concurrent
//!   handles never observe stale cached data
//! - **Fail closed**: store errors are logged and reported as `NotFound`,
//!   never propagated into the driver thread
//! - **Shared, not global**: the store handle is an `Arc<Database>` owned by
//!   the mount context, so several mounts can coexist in one process
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlitefs::{Database, Dispatcher, FileInfo, Status, Timestamps};
//! use std::sync::Arc;
//!
//! # fn main() -> sqlitefs::Result<()> {
//! let db = Arc::new(Database::open_in_memory()?);
//! db.insert_file("/a.txt", b"hello world", Timestamps::now())?;
//!
//! let fs = Dispatcher::new(db);
//! let mut buf = [0u8; 5];
//! let (status, n) = fs.read_file("/a.txt", &mut buf, 0, &FileInfo::new());
//!
//! assert_eq!(status, Status::Success);
//! assert_eq!(&buf[..n], b"hello");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! driver callback (path, params)
//!        │
//!        ▼
//! ┌──────────────┐  kind lookup   ┌──────────────────┐
//! │  Dispatcher  │ ─────────────► │ StatementFactory │
//! └──────┬───────┘                └────────┬─────────┘
//!        │ Box<dyn Entry>                  │ RowCursor
//!        ▼                                 ▼
//! ┌──────────────┐  find / remove  ┌──────────────────┐
//! │     File     │ ──────────────► │  Database (Arc)  │
//! └──────────────┘                 └──────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod dispatch;
pub mod entry;
pub mod error;
pub mod file;
pub mod info;
pub mod status;
pub mod time;
pub mod validation;

pub use config::{StoreBuilder, StoreConfig};
pub use db::schema::{EntryKind, Timestamps};
pub use db::{Column, Database, RowCursor, Statement, StatementFactory};
pub use dispatch::{DirectoryFactory, Dispatcher};
pub use entry::{Entry, EntryBase};
pub use error::{Result, SqliteFsError};
pub use file::File;
pub use info::{CreateDisposition, CreateRequest, FileInfo, FileInformation, FindData};
pub use status::{OpError, OpResult, Status};
pub use time::FileTime;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
