//! Per-call parameters and outputs of the driver callbacks

use crate::time::FileTime;

/// `CreateOptions` bits
pub mod create_options {
    pub const FILE_DIRECTORY_FILE: u32 = 0x0000_0001;
    pub const FILE_NON_DIRECTORY_FILE: u32 = 0x0000_0040;
    pub const FILE_DELETE_ON_CLOSE: u32 = 0x0000_1000;
}

/// File attribute bits
pub mod attributes {
    pub const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x0000_0010;
    pub const FILE_ATTRIBUTE_NORMAL: u32 = 0x0000_0080;
}

/// Handle metadata the driver passes with every callback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileInfo {
    /// The open targets a directory
    pub is_directory: bool,
    /// Remove the row when the last handle is cleaned up
    pub delete_on_close: bool,
}

impl FileInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(mut self) -> Self {
        self.is_directory = true;
        self
    }

    pub fn delete_on_close(mut self, delete_on_close: bool) -> Self {
        self.delete_on_close = delete_on_close;
        self
    }
}

/// Caller intent on open
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateDisposition {
    CreateNew = 1,
    CreateAlways = 2,
    OpenExisting = 3,
    OpenAlways = 4,
    TruncateExisting = 5,
}

impl CreateDisposition {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::CreateNew),
            2 => Some(Self::CreateAlways),
            3 => Some(Self::OpenExisting),
            4 => Some(Self::OpenAlways),
            5 => Some(Self::TruncateExisting),
            _ => None,
        }
    }

    /// Open-or-create and create-always would replace an existing row
    pub fn may_overwrite(self) -> bool {
        matches!(self, Self::OpenAlways | Self::CreateAlways)
    }
}

/// Parameters of a create/open request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateRequest {
    /// Opaque security context token from the driver (never interpreted)
    pub security_context: u64,
    pub desired_access: u32,
    pub file_attributes: u32,
    pub share_access: u32,
    pub disposition: CreateDisposition,
    pub create_options: u32,
}

impl CreateRequest {
    /// Plain open of an existing entry
    pub fn open_existing() -> Self {
        Self::with_disposition(CreateDisposition::OpenExisting)
    }

    pub fn with_disposition(disposition: CreateDisposition) -> Self {
        CreateRequest {
            security_context: 0,
            desired_access: 0,
            file_attributes: attributes::FILE_ATTRIBUTE_NORMAL,
            share_access: 0,
            disposition,
            create_options: 0,
        }
    }

    pub fn options(mut self, create_options: u32) -> Self {
        self.create_options = create_options;
        self
    }

    pub fn directory_only(&self) -> bool {
        self.create_options & create_options::FILE_DIRECTORY_FILE != 0
    }
}

/// Output of `get_file_information`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileInformation {
    pub attributes: u32,
    pub creation_time: FileTime,
    pub last_access_time: FileTime,
    pub last_write_time: FileTime,
    pub file_size_high: u32,
    pub file_size_low: u32,
    pub number_of_links: u32,
}

impl FileInformation {
    pub fn set_file_size(&mut self, size: u64) {
        self.file_size_high = (size >> 32) as u32;
        self.file_size_low = size as u32;
    }

    pub fn file_size(&self) -> u64 {
        ((self.file_size_high as u64) << 32) | self.file_size_low as u64
    }
}

/// One record produced by directory enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindData {
    pub file_name: String,
    pub attributes: u32,
    pub creation_time: FileTime,
    pub last_access_time: FileTime,
    pub last_write_time: FileTime,
    pub file_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_codes() {
        assert_eq!(CreateDisposition::from_u32(2), Some(CreateDisposition::CreateAlways));
        assert_eq!(CreateDisposition::from_u32(4), Some(CreateDisposition::OpenAlways));
        assert_eq!(CreateDisposition::from_u32(0), None);
        assert!(CreateDisposition::OpenAlways.may_overwrite());
        assert!(CreateDisposition::CreateAlways.may_overwrite());
        assert!(!CreateDisposition::OpenExisting.may_overwrite());
        assert!(!CreateDisposition::CreateNew.may_overwrite());
    }

    #[test]
    fn test_file_size_words() {
        let mut info = FileInformation::default();
        info.set_file_size(0x0000_0001_0000_0002);
        assert_eq!(info.file_size_high, 1);
        assert_eq!(info.file_size_low, 2);
        assert_eq!(info.file_size(), 0x0000_0001_0000_0002);
    }

    #[test]
    fn test_file_info_builder() {
        assert_eq!(
            FileInfo::new(),
            FileInfo {
                is_directory: false,
                delete_on_close: false,
            }
        );
        assert_eq!(
            FileInfo::new().directory().delete_on_close(true),
            FileInfo {
                is_directory: true,
                delete_on_close: true,
            }
        );
    }

    #[test]
    fn test_directory_only() {
        let req = CreateRequest::open_existing().options(create_options::FILE_DIRECTORY_FILE);
        assert!(req.directory_only());
        assert!(!CreateRequest::open_existing()
            .options(create_options::FILE_NON_DIRECTORY_FILE)
            .directory_only());
    }
}
