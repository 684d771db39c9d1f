//! Central directory entry headers.

use romzip_common::strings::{ends_with_any_ignore_case, starts_with_ignore_case};

use crate::zip::{flags, CentralDirectoryHeader, CompressionMethod, Record};

/// File extensions recognized as cartridge images.
pub const ROM_EXTENSIONS: [&str; 3] = [".a26", ".bin", ".rom"];

/// Name prefix of the resource-fork directories macOS adds to archives.
pub const MACOS_METADATA_PREFIX: &str = "__MACOSX";

/// One entry of an archive's central directory.
///
/// The header owns its file name, so it stays valid independently of the
/// central directory buffer it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    /// Record signature as found in the central directory.
    pub signature: u32,
    /// Version made by.
    pub version_made_by: u16,
    /// Version needed to extract.
    pub version_needed: u16,
    /// General purpose bit flag.
    pub flags: u16,
    /// Raw compression method number.
    pub compression: u16,
    /// DOS modification time.
    pub file_time: u16,
    /// DOS modification date.
    pub file_date: u16,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Compressed size in bytes.
    pub compressed_length: u32,
    /// Uncompressed size in bytes.
    pub uncompressed_length: u32,
    /// Length of the file name in the central directory.
    pub filename_length: u16,
    /// Length of the central directory extra field.
    pub extra_field_length: u16,
    /// Length of the entry comment.
    pub file_comment_length: u16,
    /// Disk on which the entry starts.
    pub start_disk_number: u16,
    /// Internal file attributes.
    pub internal_attributes: u16,
    /// External file attributes.
    pub external_attributes: u32,
    /// Offset of the entry's local header.
    pub local_header_offset: u32,
    /// File name, decoded lossily as UTF-8.
    pub filename: String,
}

impl EntryHeader {
    pub(crate) fn from_record(signature: u32, record: &CentralDirectoryHeader, filename: String) -> Self {
        Self {
            signature,
            version_made_by: record.made_by,
            version_needed: record.needed_version,
            flags: record.flags,
            compression: record.method,
            file_time: record.mod_time,
            file_date: record.mod_date,
            crc32: record.crc32,
            compressed_length: record.compressed_length,
            uncompressed_length: record.uncompressed_length,
            filename_length: record.filename_length,
            extra_field_length: record.extra_length,
            file_comment_length: record.comment_length,
            start_disk_number: record.start_disk,
            internal_attributes: record.internal_attributes,
            external_attributes: record.external_attributes,
            local_header_offset: record.local_header_offset,
            filename,
        }
    }

    /// Total bytes this record occupies in the central directory.
    #[inline]
    pub fn record_length(&self) -> usize {
        CentralDirectoryHeader::SIZE
            + self.filename_length as usize
            + self.extra_field_length as usize
            + self.file_comment_length as usize
    }

    /// The compression method, or the raw number if it is not supported.
    #[inline]
    pub fn compression_method(&self) -> Result<CompressionMethod, u16> {
        CompressionMethod::try_from(self.compression)
    }

    #[inline]
    pub fn has_valid_signature(&self) -> bool {
        self.signature == CentralDirectoryHeader::SIGNATURE
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.flags & flags::ENCRYPTED != 0
    }

    /// Check if this entry represents a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.filename.ends_with('/') || self.filename.ends_with('\\')
    }

    /// Whether the name ends in one of [`ROM_EXTENSIONS`].
    pub fn has_rom_extension(&self) -> bool {
        ends_with_any_ignore_case(&self.filename, &ROM_EXTENSIONS)
    }

    /// Whether the entry should be offered to a loader.
    ///
    /// Empty entries (directories, placeholders) and macOS metadata are
    /// skipped.
    pub fn is_listable(&self) -> bool {
        self.uncompressed_length > 0 && !starts_with_ignore_case(&self.filename, MACOS_METADATA_PREFIX)
    }

    /// Parse modification date to (year, month, day).
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.file_date & 0x1F) as u8;
        let month = ((self.file_date >> 5) & 0x0F) as u8;
        let year = ((self.file_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second).
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.file_time & 0x1F) * 2) as u8;
        let minute = ((self.file_time >> 5) & 0x3F) as u8;
        let hour = ((self.file_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str, uncompressed_length: u32) -> EntryHeader {
        EntryHeader {
            signature: CentralDirectoryHeader::SIGNATURE,
            version_made_by: 20,
            version_needed: 20,
            flags: 0,
            compression: 8,
            file_time: 0x6000,
            file_date: 0x5A21,
            crc32: 0,
            compressed_length: uncompressed_length,
            uncompressed_length,
            filename_length: name.len() as u16,
            extra_field_length: 4,
            file_comment_length: 2,
            start_disk_number: 0,
            internal_attributes: 0,
            external_attributes: 0,
            local_header_offset: 0,
            filename: name.to_string(),
        }
    }

    #[test]
    fn test_record_length() {
        let entry = header("game.bin", 10);
        assert_eq!(entry.record_length(), 46 + 8 + 4 + 2);
    }

    #[test]
    fn test_listable() {
        assert!(header("game.bin", 4096).is_listable());
        assert!(!header("empty.bin", 0).is_listable());
        assert!(!header("__MACOSX/._game.bin", 4096).is_listable());
        assert!(!header("__macosx/._game.bin", 4096).is_listable());
        assert!(header("roms/__MACOSX.bin", 4096).is_listable());
    }

    #[test]
    fn test_rom_extension() {
        assert!(header("Pitfall.A26", 1).has_rom_extension());
        assert!(header("dir/combat.bin", 1).has_rom_extension());
        assert!(header("x.Rom", 1).has_rom_extension());
        assert!(!header("readme.txt", 1).has_rom_extension());
    }

    #[test]
    fn test_flags_and_method() {
        let mut entry = header("a.bin", 1);
        assert_eq!(entry.compression_method(), Ok(CompressionMethod::Deflate));
        assert!(!entry.is_encrypted());
        assert!(entry.has_valid_signature());

        entry.flags = 0x0001;
        entry.compression = 99;
        assert!(entry.is_encrypted());
        assert_eq!(entry.compression_method(), Err(99));
    }

    #[test]
    fn test_dos_datetime() {
        let entry = header("a.bin", 1);
        assert_eq!(entry.mod_date(), (2025, 1, 1));
        assert_eq!(entry.mod_time(), (12, 0, 0));
    }

    #[test]
    fn test_is_dir() {
        assert!(header("roms/", 0).is_dir());
        assert!(!header("roms/a.bin", 0).is_dir());
    }
}
