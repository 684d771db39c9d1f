//! Walking the central directory.
//!
//! The raw central directory is read once when an archive is opened and kept
//! as an immutable byte buffer. [`CentralDirectory`] walks it with a
//! restartable cursor; [`Headers`] is a borrowing iterator with its own
//! cursor, used when a full pass must not disturb the archive's position.

use romzip_common::BinaryReader;
use tracing::warn;

use crate::entry::EntryHeader;
use crate::zip::CentralDirectoryHeader;

/// Parse the record at `cursor`, or explain why it does not fit.
fn parse_record(data: &[u8], cursor: usize) -> romzip_common::Result<EntryHeader> {
    let mut reader = BinaryReader::new_at(data, cursor);

    let signature = reader.read_u32()?;
    let record: CentralDirectoryHeader = reader.read_struct()?;

    // The whole record must fit before anything variable-length is touched.
    let variable = record.trailing_length();
    if reader.remaining() < variable {
        return Err(romzip_common::Error::UnexpectedEof {
            needed: variable,
            available: reader.remaining(),
        });
    }

    let name = reader.read_bytes(record.filename_length as usize)?;
    let filename = String::from_utf8_lossy(name).into_owned();

    Ok(EntryHeader::from_record(signature, &record, filename))
}

/// An archive's central directory with an iteration cursor.
#[derive(Debug, Clone)]
pub struct CentralDirectory {
    data: Vec<u8>,
    cursor: usize,
    corrupt: bool,
}

impl CentralDirectory {
    /// Wrap the raw central directory bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            cursor: 0,
            corrupt: false,
        }
    }

    /// Size of the central directory in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current byte offset into the central directory.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether iteration stopped on a record that overflows the directory.
    #[inline]
    pub fn is_corrupt(&self) -> bool {
        self.corrupt
    }

    /// Whether another record may follow the cursor.
    #[inline]
    pub fn has_remaining(&self) -> bool {
        !self.corrupt && self.cursor < self.data.len()
    }

    /// Rewind to the first record.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.corrupt = false;
    }

    /// Parse the record at the cursor and advance past it.
    ///
    /// Returns `None` at the end of the directory, or when the next record
    /// does not fit in the remaining bytes; the latter also marks the
    /// directory corrupt until the next [`reset`](Self::reset).
    pub fn next_entry(&mut self) -> Option<EntryHeader> {
        if !self.has_remaining() {
            return None;
        }

        match parse_record(&self.data, self.cursor) {
            Ok(header) => {
                self.cursor += header.record_length();
                Some(header)
            }
            Err(e) => {
                warn!(cursor = self.cursor, error = %e, "central directory record overflows directory");
                self.corrupt = true;
                None
            }
        }
    }

    /// Iterate over all records from the start without moving the cursor.
    pub fn headers(&self) -> Headers<'_> {
        Headers {
            data: &self.data,
            cursor: 0,
        }
    }
}

impl Iterator for CentralDirectory {
    type Item = EntryHeader;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
    }
}

/// Borrowing iterator over central directory records.
///
/// Stops at the end of the directory or at the first record that does not
/// fit.
#[derive(Debug, Clone)]
pub struct Headers<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl Iterator for Headers<'_> {
    type Item = EntryHeader;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.data.len() {
            return None;
        }

        match parse_record(self.data, self.cursor) {
            Ok(header) => {
                self.cursor += header.record_length();
                Some(header)
            }
            Err(_) => {
                self.cursor = self.data.len();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ZipBuilder;

    fn directory(builder: &ZipBuilder) -> CentralDirectory {
        CentralDirectory::new(builder.central_directory())
    }

    fn names(headers: impl Iterator<Item = EntryHeader>) -> Vec<String> {
        headers.map(|h| h.filename).collect()
    }

    #[test]
    fn test_iterates_in_archive_order() {
        let builder = ZipBuilder::new()
            .stored("game.bin", &[1; 16])
            .deflated("readme.txt", b"hello hello hello")
            .stored("zzz.rom", &[2; 4]);
        let mut cd = directory(&builder);

        assert_eq!(names(&mut cd), ["game.bin", "readme.txt", "zzz.rom"]);
        assert_eq!(cd.cursor(), cd.len());
        assert!(!cd.has_remaining());
        assert!(!cd.is_corrupt());
        assert!(cd.next_entry().is_none());
    }

    #[test]
    fn test_header_fields() {
        let builder = ZipBuilder::new().stored("a.a26", &[7; 2048]);
        let mut cd = directory(&builder);
        let header = cd.next_entry().unwrap();

        assert!(header.has_valid_signature());
        assert_eq!(header.filename, "a.a26");
        assert_eq!(header.filename_length, 5);
        assert_eq!(header.compression, 0);
        assert_eq!(header.compressed_length, 2048);
        assert_eq!(header.uncompressed_length, 2048);
        assert_eq!(header.local_header_offset, 0);
        assert_eq!(header.crc32, romzip_common::crc::checksum(&[7; 2048]));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let builder = ZipBuilder::new()
            .stored("one.bin", b"1")
            .stored("two.bin", b"22")
            .stored("three.bin", b"333");
        let mut cd = directory(&builder);

        let first = names(&mut cd);
        cd.reset();
        assert_eq!(cd.cursor(), 0);
        let second = names(&mut cd);

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_headers_does_not_move_cursor() {
        let builder = ZipBuilder::new().stored("one.bin", b"1").stored("two.bin", b"2");
        let mut cd = directory(&builder);
        cd.next_entry().unwrap();
        let cursor = cd.cursor();

        assert_eq!(names(cd.headers()), ["one.bin", "two.bin"]);
        assert_eq!(cd.cursor(), cursor);
        assert_eq!(cd.next_entry().unwrap().filename, "two.bin");
    }

    #[test]
    fn test_overflowing_record_marks_corrupt() {
        let builder = ZipBuilder::new().stored("one.bin", b"1").stored("two.bin", b"2");
        let mut bytes = builder.central_directory();
        // Drop the last byte of the second file name.
        bytes.pop();
        let mut cd = CentralDirectory::new(bytes);

        assert_eq!(cd.next_entry().unwrap().filename, "one.bin");
        assert!(cd.next_entry().is_none());
        assert!(cd.is_corrupt());
        assert!(!cd.has_remaining());

        cd.reset();
        assert!(!cd.is_corrupt());
        assert_eq!(names(cd.headers()), ["one.bin"]);
    }

    #[test]
    fn test_short_fixed_header_marks_corrupt() {
        let mut cd = CentralDirectory::new(vec![0x50, 0x4b, 0x01, 0x02, 0, 0]);
        assert!(cd.next_entry().is_none());
        assert!(cd.is_corrupt());
    }

    #[test]
    fn test_oversized_variable_lengths() {
        let builder = ZipBuilder::new().stored("one.bin", b"1");
        let mut bytes = builder.central_directory();
        // Comment length field sits at offset 32 of the record.
        bytes[32..34].copy_from_slice(&u16::MAX.to_le_bytes());
        let mut cd = CentralDirectory::new(bytes);

        assert!(cd.next_entry().is_none());
        assert!(cd.is_corrupt());
    }

    #[test]
    fn test_filename_is_owned() {
        let builder = ZipBuilder::new().stored("owned.bin", b"x");
        let header = {
            let mut cd = directory(&builder);
            cd.next_entry().unwrap()
        };
        assert_eq!(header.filename, "owned.bin");
    }

    #[test]
    fn test_empty_directory() {
        let mut cd = CentralDirectory::new(Vec::new());
        assert!(cd.is_empty());
        assert!(cd.next_entry().is_none());
        assert!(!cd.is_corrupt());
    }
}
