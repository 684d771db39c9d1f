//! Error types for the archive crate.

use std::fmt;

use thiserror::Error;

/// Errors that can occur when reading ZIP archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while opening, seeking, or reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural parse error from the binary reader.
    #[error("{0}")]
    Common(#[from] romzip_common::Error),

    /// A buffer of the requested size could not be allocated.
    #[error("out of memory allocating {0} bytes")]
    OutOfMemory(usize),

    /// Could not find the end of central directory record.
    #[error("could not find end of central directory record")]
    BadSignature,

    /// Invalid ZIP record signature.
    #[error("invalid ZIP signature: expected {expected:#010x}, got {actual:#010x}")]
    InvalidSignature { expected: u32, actual: u32 },

    /// Fewer bytes were readable than the archive declares.
    #[error("file truncated: expected {expected} bytes, read {actual}")]
    FileTruncated { expected: u64, actual: u64 },

    /// Inconsistent archive structure.
    #[error("corrupt archive: {0}")]
    Corrupt(String),

    /// Decompressed data did not match the stored checksum.
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// The archive spans several disks.
    #[error("multi-disk archives are not supported")]
    MultiDisk,

    /// The entry starts on a different disk than the archive.
    #[error("entry starts on disk {entry_disk}, archive is disk {archive_disk}")]
    DiskMismatch { entry_disk: u16, archive_disk: u16 },

    /// Unsupported compression method.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    /// Encrypted entries cannot be read.
    #[error("encrypted entries are not supported")]
    Encrypted,

    /// Output buffer cannot hold the entry.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// No archive is currently open.
    #[error("no archive is open")]
    NoArchive,

    /// Enumeration has not produced an entry to decompress.
    #[error("no current entry")]
    NoEntry,

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),
}

impl Error {
    /// Classify this error into one of the reader's error kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::NoArchive | Self::NoEntry | Self::EntryNotFound(_) => {
                ErrorKind::FileError
            }
            Self::OutOfMemory(_) => ErrorKind::OutOfMemory,
            Self::BadSignature => ErrorKind::BadSignature,
            Self::FileTruncated { .. } => ErrorKind::FileTruncated,
            Self::Common(_)
            | Self::InvalidSignature { .. }
            | Self::Corrupt(_)
            | Self::CrcMismatch { .. } => ErrorKind::FileCorrupt,
            Self::MultiDisk
            | Self::DiskMismatch { .. }
            | Self::UnsupportedCompression(_)
            | Self::Encrypted => ErrorKind::Unsupported,
            Self::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            Self::Decompression(_) => ErrorKind::DecompressError,
        }
    }
}

/// Coarse classification of archive errors.
///
/// Loaders report these to the user and abandon the affected candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutOfMemory,
    FileError,
    BadSignature,
    DecompressError,
    FileTruncated,
    FileCorrupt,
    Unsupported,
    BufferTooSmall,
}

impl ErrorKind {
    /// Short human-readable description of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OutOfMemory => "out of memory",
            Self::FileError => "file error",
            Self::BadSignature => "bad signature",
            Self::DecompressError => "decompression error",
            Self::FileTruncated => "file truncated",
            Self::FileCorrupt => "file corrupt",
            Self::Unsupported => "unsupported archive",
            Self::BufferTooSmall => "buffer too small",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let io = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.kind(), ErrorKind::FileError);
        assert_eq!(Error::BadSignature.kind(), ErrorKind::BadSignature);
        assert_eq!(Error::MultiDisk.kind(), ErrorKind::Unsupported);
        assert_eq!(Error::UnsupportedCompression(12).kind(), ErrorKind::Unsupported);
        assert_eq!(
            Error::FileTruncated { expected: 10, actual: 4 }.kind(),
            ErrorKind::FileTruncated
        );
        assert_eq!(
            Error::BufferTooSmall { needed: 2, available: 1 }.kind(),
            ErrorKind::BufferTooSmall
        );
        assert_eq!(
            Error::Decompression("bad".into()).kind(),
            ErrorKind::DecompressError
        );
        assert_eq!(Error::Corrupt("x".into()).kind(), ErrorKind::FileCorrupt);
    }

    #[test]
    fn test_kind_messages() {
        assert_eq!(ErrorKind::BadSignature.to_string(), "bad signature");
        assert_eq!(ErrorKind::OutOfMemory.as_str(), "out of memory");
        assert_eq!(
            Error::UnsupportedCompression(14).to_string(),
            "unsupported compression method: 14"
        );
    }
}
