//! Callback result taxonomy
//!
//! Every filesystem callback ends in exactly one [`Status`]. Operations are
//! written against [`OpResult`], and the dispatcher flattens that into a
//! status (and the raw NTSTATUS value the driver framework expects).

use thiserror::Error;

/// Result type returned by entry callbacks
pub type OpResult<T> = std::result::Result<T, OpError>;

/// Non-success outcome of a callback
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpError {
    /// Lookup found no row (also used for downgraded store failures)
    #[error("object name not found")]
    NotFound,

    /// Directory semantics requested against a file node
    #[error("not a directory")]
    NotADirectory,

    /// Operation intentionally unimplemented
    #[error("operation not supported")]
    NotSupported,

    /// Create-with-overwrite against an existing path
    #[error("object name collision")]
    NameCollision,

    #[error("access denied")]
    AccessDenied,

    /// Caller-supplied parameter out of range (e.g. a negative read offset)
    #[error("invalid parameter")]
    InvalidParameter,
}

/// Full callback outcome, including success
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success = 0x0000_0000,
    NotFound = 0xC000_0034,
    NotADirectory = 0xC000_0103,
    NotSupported = 0xC000_0002,
    NameCollision = 0xC000_0035,
    AccessDenied = 0xC000_0022,
    InvalidParameter = 0xC000_000D,
}

impl Status {
    /// Raw NTSTATUS value
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Parse a raw NTSTATUS value
    ///
    /// Returns `None` for codes outside the taxonomy.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0x0000_0000 => Some(Self::Success),
            0xC000_0034 => Some(Self::NotFound),
            0xC000_0103 => Some(Self::NotADirectory),
            0xC000_0002 => Some(Self::NotSupported),
            0xC000_0035 => Some(Self::NameCollision),
            0xC000_0022 => Some(Self::AccessDenied),
            0xC000_000D => Some(Self::InvalidParameter),
            _ => None,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl From<OpError> for Status {
    fn from(err: OpError) -> Self {
        match err {
            OpError::NotFound => Status::NotFound,
            OpError::NotADirectory => Status::NotADirectory,
            OpError::NotSupported => Status::NotSupported,
            OpError::NameCollision => Status::NameCollision,
            OpError::AccessDenied => Status::AccessDenied,
            OpError::InvalidParameter => Status::InvalidParameter,
        }
    }
}

impl<T> From<&OpResult<T>> for Status {
    fn from(result: &OpResult<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => (*e).into(),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (0x{:08X})", self, self.code())
    }
}
