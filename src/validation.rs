//! Validation for table names and mount paths
//!
//! The table name is the only identifier interpolated into statement text,
//! so it is checked strictly. Paths are always bound as parameters but are
//! normalized once at the dispatch boundary so every row key follows one
//! convention.

use crate::error::{Result, SqliteFsError};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::OnceLock;

/// Validated SQL table identifier
///
/// # Rules
/// - ASCII letters, digits and underscores only
/// - Must not start with a digit
/// - Length: 1-64 characters
///
/// # Examples
///
/// ```
/// use sqlitefs::validation::TableName;
///
/// assert!(TableName::new("entries").is_ok());
/// assert!(TableName::new("fs_rows_2").is_ok());
/// assert!(TableName::new("2fast").is_err());
/// assert!(TableName::new("entries; DROP TABLE x").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    const PATTERN: &'static str = r"^[A-Za-z_][A-Za-z0-9_]*$";

    const MAX_LENGTH: usize = 64;

    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(TableName(name))
    }

    fn validate(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(SqliteFsError::InvalidTableName(
                "table name cannot be empty".to_string(),
            ));
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(SqliteFsError::InvalidTableName(format!(
                "table name too long (max {} characters)",
                Self::MAX_LENGTH
            )));
        }

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(Self::PATTERN).expect("static pattern"));
        if !re.is_match(name) {
            return Err(SqliteFsError::InvalidTableName(format!(
                "'{}' must contain only letters, digits and underscores",
                name
            )));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        TableName(String::from("entries"))
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TableName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TableName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TableName::new(s).map_err(serde::de::Error::custom)
    }
}

/// Normalize a path handed over by the driver
///
/// - `\` separators become `/`
/// - A leading `/` is always present
/// - Repeated and trailing separators are collapsed (root stays `/`)
/// - `.` / `..` components and NUL bytes are rejected
///
/// # Examples
///
/// ```
/// use sqlitefs::validation::normalize_path;
///
/// assert_eq!(normalize_path("\\docs\\a.txt").unwrap(), "/docs/a.txt");
/// assert_eq!(normalize_path("docs//a.txt/").unwrap(), "/docs/a.txt");
/// assert_eq!(normalize_path("\\").unwrap(), "/");
/// assert!(normalize_path("/docs/../etc").is_err());
/// ```
pub fn normalize_path(path: &str) -> Result<String> {
    if path.contains('\0') {
        return Err(SqliteFsError::InvalidPath(
            "path contains a NUL byte".to_string(),
        ));
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    for component in path.split(['/', '\\']).filter(|c| !c.is_empty()) {
        if component == "." || component == ".." {
            return Err(SqliteFsError::InvalidPath(format!(
                "relative component '{}' in {}",
                component, path
            )));
        }
        normalized.push('/');
        normalized.push_str(component);
    }

    if normalized.is_empty() {
        normalized.push('/');
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table_names() {
        assert!(TableName::new("entries").is_ok());
        assert!(TableName::new("_private").is_ok());
        assert!(TableName::new("Files2").is_ok());
        assert!(TableName::new("a".repeat(64)).is_ok());
    }

    #[test]
    fn test_invalid_table_names() {
        assert!(TableName::new("").is_err());
        assert!(TableName::new("9lives").is_err());
        assert!(TableName::new("my-table").is_err());
        assert!(TableName::new("my table").is_err());
        assert!(TableName::new("t\"x").is_err());
        assert!(TableName::new("a".repeat(65)).is_err());
    }

    #[test]
    fn test_table_name_serde() {
        let name: TableName = serde_json::from_str("\"blobs\"").unwrap();
        assert_eq!(name.as_str(), "blobs");
        assert!(serde_json::from_str::<TableName>("\"bad name\"").is_err());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/a.txt").unwrap(), "/a.txt");
        assert_eq!(normalize_path("a.txt").unwrap(), "/a.txt");
        assert_eq!(normalize_path("\\dir\\a.txt").unwrap(), "/dir/a.txt");
        assert_eq!(normalize_path("//dir///a.txt//").unwrap(), "/dir/a.txt");
        assert_eq!(normalize_path("").unwrap(), "/");
        assert_eq!(normalize_path("/").unwrap(), "/");
    }

    #[test]
    fn test_normalize_rejects() {
        assert!(normalize_path("/a/./b").is_err());
        assert!(normalize_path("\\..\\b").is_err());
        assert!(normalize_path("/a\0b").is_err());
    }
}
