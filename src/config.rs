//! Store configuration
//!
//! A mount context is configured either from a TOML file or through
//! [`StoreBuilder`]:
//!
//! ```toml
//! path = "/var/lib/sqlitefs/files.db"
//! table = "entries"
//! read_only = true
//! busy_timeout_ms = 2000
//! ```

use crate::db::Database;
use crate::error::Result;
use crate::validation::TableName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Configuration for opening a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file. `None` opens a private in-memory database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Table holding one row per filesystem path
    #[serde(default)]
    pub table: TableName,

    /// Open the connection read-only
    #[serde(default)]
    pub read_only: bool,

    /// How long a statement waits on a locked database before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: None,
            table: TableName::default(),
            read_only: false,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Builder for opening a store
///
/// # Examples
///
/// ```rust,no_run
/// use sqlitefs::StoreBuilder;
///
/// # fn main() -> sqlitefs::Result<()> {
/// let db = StoreBuilder::new()
///     .path("/data/files.db")
///     .table("entries")
///     .read_only(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct StoreBuilder {
    path: Option<PathBuf>,
    table: Option<String>,
    read_only: bool,
    busy_timeout: Option<Duration>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        StoreBuilder {
            path: None,
            table: None,
            read_only: false,
            busy_timeout: None,
        }
    }

    /// Database file (omit for an in-memory store)
    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.path = None;
        self
    }

    pub fn table<S: Into<String>>(mut self, table: S) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Validate the settings without opening anything
    pub fn config(self) -> Result<StoreConfig> {
        let table = match self.table {
            Some(name) => TableName::new(name)?,
            None => TableName::default(),
        };

        Ok(StoreConfig {
            path: self.path,
            table,
            read_only: self.read_only,
            busy_timeout_ms: self
                .busy_timeout
                .map(|d| d.as_millis() as u64)
                .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
        })
    }

    pub fn build(self) -> Result<Arc<Database>> {
        let config = self.config()?;
        Ok(Arc::new(Database::open(&config)?))
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.table.as_str(), "entries");
        assert!(!config.read_only);
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert!(config.path.is_none());
    }

    #[test]
    fn test_from_toml() {
        let config = StoreConfig::from_toml_str(
            r#"
            path = "/tmp/files.db"
            table = "blobs"
            read_only = true
            busy_timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.path, Some(PathBuf::from("/tmp/files.db")));
        assert_eq!(config.table.as_str(), "blobs");
        assert!(config.read_only);
        assert_eq!(config.busy_timeout_ms, 250);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = StoreConfig::from_toml_str("read_only = true").unwrap();
        assert_eq!(config.table.as_str(), "entries");
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn test_from_toml_rejects_bad_table() {
        assert!(StoreConfig::from_toml_str("table = \"x; drop\"").is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "table = \"files\"\n").unwrap();

        let config = StoreConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.table.as_str(), "files");
    }

    #[test]
    fn test_builder_config() {
        let config = StoreBuilder::new()
            .path("files.db")
            .table("files")
            .read_only(true)
            .busy_timeout(Duration::from_millis(100))
            .config()
            .unwrap();

        assert_eq!(config.path, Some(PathBuf::from("files.db")));
        assert_eq!(config.table.as_str(), "files");
        assert!(config.read_only);
        assert_eq!(config.busy_timeout_ms, 100);

        assert!(StoreBuilder::new().table("bad-name").config().is_err());
    }
}
