//! Local file header.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::Record;

/// Header in front of each entry's data, minus its signature.
///
/// The reader only needs the two trailing lengths to find where the data
/// begins; sizes and method are taken from the central directory.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LocalFileHeader {
    pub needed_version: u16,
    pub flags: u16,
    pub method: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc32: u32,
    pub compressed_length: u32,
    pub uncompressed_length: u32,
    pub filename_length: u16,
    pub extra_length: u16,
}

impl LocalFileHeader {
    /// Bytes of name and extra field between this header and the data.
    #[inline]
    pub fn trailing_length(&self) -> usize {
        self.filename_length as usize + self.extra_length as usize
    }
}

impl Record for LocalFileHeader {
    const SIGNATURE: u32 = 0x0403_4b50;
}
