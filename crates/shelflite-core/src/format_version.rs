//! File format versions for ShelfLite
//!
//! Every collection file starts with a header naming its format and
//! version, so a newer layout can be told apart from an older one.

/// Collection file format version
pub const COLLECTION_FORMAT_VERSION: u16 = 1;

/// Magic string written in every collection file header
pub const COLLECTION_MAGIC: &str = "SHELFLITE";

/// Version compatibility information
pub struct FormatVersion {
    /// Current version of this format
    pub current: u16,
    /// Minimum supported version for reading
    pub min_read: u16,
}

impl FormatVersion {
    /// Check if a version can be read
    pub fn can_read(&self, version: u16) -> bool {
        version >= self.min_read && version <= self.current
    }
}

/// Collection file format version info
pub fn collection_version() -> FormatVersion {
    FormatVersion {
        current: COLLECTION_FORMAT_VERSION,
        min_read: 1,
    }
}
