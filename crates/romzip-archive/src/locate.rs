//! Locating the End of Central Directory record.
//!
//! The EOCD sits at the very end of an archive, but it may be followed by an
//! archive comment of up to 65535 bytes whose length is unknown until the
//! record is found. The locator therefore reads a small window from the tail
//! of the file, scans it backwards for the EOCD signature, and doubles the
//! window until either the signature turns up or the window covers the
//! largest possible record-plus-comment span.

use std::borrow::Cow;
use std::io::{self, Read, Seek};

use romzip_common::BinaryReader;
use tracing::debug;

use crate::source::read_at;
use crate::zip::{EocdRecord, Record};
use crate::{Error, Result};

/// Size of the first tail window searched for the EOCD.
pub const ECD_INITIAL_WINDOW: u64 = 1024;

/// Longest archive comment the format can express.
pub const MAX_COMMENT_LENGTH: u64 = u16::MAX as u64;

/// Largest tail window ever searched: one EOCD plus a maximal comment.
pub const ECD_MAX_WINDOW: u64 = EocdRecord::SIZE as u64 + MAX_COMMENT_LENGTH;

/// Parsed End of Central Directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Number of this disk.
    pub disk_number: u16,
    /// Disk on which the central directory starts.
    pub cd_start_disk_number: u16,
    /// Central directory entries on this disk.
    pub cd_disk_entries: u16,
    /// Central directory entries in total.
    pub cd_total_entries: u16,
    /// Size of the central directory in bytes.
    pub cd_size: u32,
    /// Offset of the central directory from the start of the file.
    pub cd_offset: u32,
    /// Declared comment length.
    pub comment_length: u16,
    /// Comment bytes present after the record.
    pub comment: Vec<u8>,
    /// Absolute file offset of the record's signature.
    pub offset: u64,
}

impl EndOfCentralDirectory {
    /// Parse a record starting at its signature.
    ///
    /// `bytes` runs from the signature to the end of the search window; the
    /// comment is taken from what follows the fixed record, clamped to the
    /// declared length.
    pub fn parse(bytes: &[u8], offset: u64) -> Result<Self> {
        let mut reader = BinaryReader::new(bytes);
        reader.expect_magic(&EocdRecord::MAGIC)?;
        let record: EocdRecord = reader.read_struct()?;

        let trailing = reader.remaining_bytes();
        let comment_len = (record.comment_length as usize).min(trailing.len());

        Ok(Self {
            disk_number: record.disk_number,
            cd_start_disk_number: record.cd_start_disk,
            cd_disk_entries: record.cd_disk_entries,
            cd_total_entries: record.cd_total_entries,
            cd_size: record.cd_size,
            cd_offset: record.cd_offset,
            comment_length: record.comment_length,
            comment: trailing[..comment_len].to_vec(),
            offset,
        })
    }

    /// Whether the whole central directory lives on this one disk.
    #[inline]
    pub fn is_single_disk(&self) -> bool {
        self.disk_number == self.cd_start_disk_number
            && self.cd_disk_entries == self.cd_total_entries
    }

    /// The archive comment, decoded lossily as UTF-8.
    pub fn comment_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.comment)
    }
}

/// Find and parse the EOCD of a stream whose total length is `file_length`.
///
/// # Errors
///
/// - [`Error::BadSignature`] if no signature is found within
///   [`ECD_MAX_WINDOW`] bytes of the end (or the file is too short to hold
///   one).
/// - [`Error::Io`] if the tail of the file cannot be read in full.
pub fn locate<R: Read + Seek>(stream: &mut R, file_length: u64) -> Result<EndOfCentralDirectory> {
    if file_length < EocdRecord::SIZE as u64 {
        return Err(Error::BadSignature);
    }

    let limit = file_length.min(ECD_MAX_WINDOW);
    let mut window = ECD_INITIAL_WINDOW.min(limit);

    loop {
        let start = file_length - window;
        let mut buffer = vec![0u8; window as usize];

        let read = read_at(stream, start, &mut buffer)?;
        if read != buffer.len() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("short read of archive tail: {} of {} bytes", read, buffer.len()),
            )));
        }

        if let Some(position) = find_signature(&buffer) {
            let ecd = EndOfCentralDirectory::parse(&buffer[position..], start + position as u64)?;
            debug!(
                offset = ecd.offset,
                entries = ecd.cd_total_entries,
                cd_size = ecd.cd_size,
                "found end of central directory"
            );
            return Ok(ecd);
        }

        if window >= limit {
            return Err(Error::BadSignature);
        }

        window = (window * 2).min(limit);
        debug!(window, "EOCD not in tail window, widening search");
    }
}

/// Position of the last EOCD signature that leaves room for a full record.
fn find_signature(window: &[u8]) -> Option<usize> {
    let searchable = window.len().checked_sub(EocdRecord::SIZE)? + EocdRecord::MAGIC.len();
    memchr::memmem::rfind(&window[..searchable], &EocdRecord::MAGIC)
}
