//! Central directory file header.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::Record;

/// One central directory record, minus its signature.
///
/// Followed on disk by the file name, extra field, and comment.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct CentralDirectoryHeader {
    pub made_by: u16,
    pub needed_version: u16,
    pub flags: u16,
    pub method: u16,
    /// DOS time.
    pub mod_time: u16,
    /// DOS date.
    pub mod_date: u16,
    pub crc32: u32,
    pub compressed_length: u32,
    pub uncompressed_length: u32,
    pub filename_length: u16,
    pub extra_length: u16,
    pub comment_length: u16,
    pub start_disk: u16,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader {
    /// Bytes of name, extra field, and comment following the fixed part.
    #[inline]
    pub fn trailing_length(&self) -> usize {
        self.filename_length as usize + self.extra_length as usize + self.comment_length as usize
    }
}

impl Record for CentralDirectoryHeader {
    const SIGNATURE: u32 = 0x0201_4b50;
}

/// General purpose flag bits.
pub mod flags {
    /// Entry data is encrypted.
    pub const ENCRYPTED: u16 = 0x0001;
}
