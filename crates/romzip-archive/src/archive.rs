//! ZIP archive reader.
//!
//! Opening an archive locates the End of Central Directory, rejects
//! multi-disk archives, and reads the whole central directory into memory.
//! Entries are then enumerated from that buffer and decompressed on demand
//! straight from the underlying stream.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use romzip_common::BinaryReader;
use tracing::debug;

use crate::decompress;
use crate::directory::CentralDirectory;
use crate::entry::EntryHeader;
use crate::locate::{self, EndOfCentralDirectory};
use crate::source::read_at;
use crate::zip::{CompressionMethod, LocalFileHeader, Record};
use crate::{Error, Result};

/// An open ZIP archive.
///
/// Generic over any seekable byte source; [`ZipArchive::open`] uses a file.
#[derive(Debug)]
pub struct ZipArchive<R> {
    source: R,
    path: PathBuf,
    length: u64,
    ecd: EndOfCentralDirectory,
    directory: CentralDirectory,
    rom_files: usize,
}

impl ZipArchive<File> {
    /// Open the archive at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_source(file, path)
    }
}

impl<R: Read + Seek> ZipArchive<R> {
    /// Read the archive structure from an already open source.
    ///
    /// `path` is only recorded; it is what the archive cache keys on.
    pub fn from_source<P: Into<PathBuf>>(mut source: R, path: P) -> Result<Self> {
        let path = path.into();
        let length = source.seek(SeekFrom::End(0))?;

        let ecd = locate::locate(&mut source, length)?;
        if !ecd.is_single_disk() {
            return Err(Error::MultiDisk);
        }

        // The directory has to sit between the file start and the ECD.
        let cd_end = ecd.cd_offset as u64 + ecd.cd_size as u64;
        if cd_end > ecd.offset {
            return Err(Error::FileTruncated {
                expected: ecd.cd_size as u64,
                actual: ecd.offset.saturating_sub(ecd.cd_offset as u64),
            });
        }

        let cd_size = ecd.cd_size as usize;
        let mut data = zeroed(cd_size)?;

        let read = read_at(&mut source, ecd.cd_offset as u64, &mut data)?;
        if read != cd_size {
            return Err(Error::FileTruncated {
                expected: cd_size as u64,
                actual: read as u64,
            });
        }

        let directory = CentralDirectory::new(data);
        let rom_files = directory
            .headers()
            .filter(|h| h.is_listable() && h.has_rom_extension())
            .count();

        debug!(
            path = %path.display(),
            length,
            entries = ecd.cd_total_entries,
            rom_files,
            "opened archive"
        );

        Ok(Self {
            source,
            path,
            length,
            ecd,
            directory,
            rom_files,
        })
    }
}

impl<R> ZipArchive<R> {
    /// Path the archive was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The archive's End of Central Directory record.
    #[inline]
    pub fn ecd(&self) -> &EndOfCentralDirectory {
        &self.ecd
    }

    /// Total length of the archive in bytes.
    #[inline]
    pub fn file_length(&self) -> u64 {
        self.length
    }

    /// Number of listable entries with a cartridge image extension.
    #[inline]
    pub fn rom_files(&self) -> usize {
        self.rom_files
    }

    #[inline]
    pub fn central_directory(&self) -> &CentralDirectory {
        &self.directory
    }

    /// Whether enumeration stopped on a malformed directory record.
    #[inline]
    pub fn is_corrupt(&self) -> bool {
        self.directory.is_corrupt()
    }

    /// Restart enumeration from the first entry.
    pub fn reset(&mut self) {
        self.directory.reset();
    }

    /// Whether the central directory has more records after the cursor.
    ///
    /// Records skipped by [`next_entry`](Self::next_entry) count here, so a
    /// `true` answer may still be followed by `None`.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.directory.has_remaining()
    }

    /// The next raw record, including empty and metadata entries.
    pub fn next_header(&mut self) -> Option<EntryHeader> {
        self.directory.next_entry()
    }

    /// The next entry worth offering to a loader.
    ///
    /// Skips zero-length entries and macOS metadata.
    pub fn next_entry(&mut self) -> Option<EntryHeader> {
        while let Some(header) = self.directory.next_entry() {
            if header.is_listable() {
                return Some(header);
            }
        }
        None
    }

    /// All listable entries, without moving the enumeration cursor.
    pub fn entries(&self) -> impl Iterator<Item = EntryHeader> + '_ {
        self.directory.headers().filter(EntryHeader::is_listable)
    }

    /// Find an entry by name.
    ///
    /// An exact match wins; otherwise the first ASCII case-insensitive match
    /// is returned.
    pub fn find(&self, name: &str) -> Option<EntryHeader> {
        let mut fallback = None;
        for header in self.directory.headers() {
            if header.filename == name {
                return Some(header);
            }
            if fallback.is_none() && header.filename.eq_ignore_ascii_case(name) {
                fallback = Some(header);
            }
        }
        fallback
    }
}

impl<R: Read + Seek> ZipArchive<R> {
    /// Decompress `header` into the front of `out`.
    ///
    /// Returns the number of bytes written, always the entry's uncompressed
    /// length. `out` is left untouched when the entry is rejected before any
    /// data is read.
    pub fn decompress(&mut self, header: &EntryHeader, out: &mut [u8]) -> Result<usize> {
        let size = header.uncompressed_length as usize;
        if out.len() < size {
            return Err(Error::BufferTooSmall {
                needed: size,
                available: out.len(),
            });
        }

        let (method, data_offset) = self.prepare(header)?;
        self.extract(header, method, data_offset, &mut out[..size])
    }

    /// Decompress `header` into a newly allocated buffer.
    ///
    /// The entry is checked against the archive before anything is allocated.
    pub fn read(&mut self, header: &EntryHeader) -> Result<Vec<u8>> {
        let (method, data_offset) = self.prepare(header)?;
        let mut out = zeroed(header.uncompressed_length as usize)?;
        self.extract(header, method, data_offset, &mut out)?;
        Ok(out)
    }

    /// Checks shared by [`decompress`](Self::decompress) and
    /// [`read`](Self::read). Returns the method and data offset.
    fn prepare(&mut self, header: &EntryHeader) -> Result<(CompressionMethod, u64)> {
        if header.start_disk_number != self.ecd.disk_number {
            return Err(Error::DiskMismatch {
                entry_disk: header.start_disk_number,
                archive_disk: self.ecd.disk_number,
            });
        }

        if header.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let method = header
            .compression_method()
            .map_err(Error::UnsupportedCompression)?;

        let data_offset = self.data_offset(header)?;

        if method == CompressionMethod::Store
            && header.compressed_length != header.uncompressed_length
        {
            return Err(Error::Corrupt(format!(
                "stored entry {} has compressed length {} but uncompressed length {}",
                header.filename, header.compressed_length, header.uncompressed_length
            )));
        }

        let compressed = header.compressed_length as u64;
        let available = self.length.saturating_sub(data_offset);
        if compressed > available {
            return Err(Error::FileTruncated {
                expected: compressed,
                actual: available,
            });
        }

        let uncompressed = header.uncompressed_length as u64;
        if method == CompressionMethod::Deflate
            && uncompressed > compressed.saturating_mul(decompress::MAX_DEFLATE_RATIO)
        {
            return Err(Error::Corrupt(format!(
                "deflated entry {} cannot expand {} bytes to {}",
                header.filename, compressed, uncompressed
            )));
        }

        Ok((method, data_offset))
    }

    fn extract(
        &mut self,
        header: &EntryHeader,
        method: CompressionMethod,
        data_offset: u64,
        out: &mut [u8],
    ) -> Result<usize> {
        debug!(name = %header.filename, %method, size = out.len(), "decompressing entry");

        match method {
            CompressionMethod::Store => decompress::read_stored(&mut self.source, data_offset, out),
            CompressionMethod::Deflate => decompress::inflate_raw(
                &mut self.source,
                data_offset,
                header.compressed_length as u64,
                out,
            ),
        }
    }

    /// Absolute offset of an entry's data, past its local header.
    fn data_offset(&mut self, header: &EntryHeader) -> Result<u64> {
        let offset = header.local_header_offset as u64;
        let mut buf = [0u8; LocalFileHeader::SIZE];

        let read = read_at(&mut self.source, offset, &mut buf)?;
        if read != buf.len() {
            return Err(Error::FileTruncated {
                expected: buf.len() as u64,
                actual: read as u64,
            });
        }

        let mut reader = BinaryReader::new(&buf);
        let signature = reader.read_u32()?;
        if signature != LocalFileHeader::SIGNATURE {
            return Err(Error::InvalidSignature {
                expected: LocalFileHeader::SIGNATURE,
                actual: signature,
            });
        }
        let local: LocalFileHeader = reader.read_struct()?;

        Ok(offset + LocalFileHeader::SIZE as u64 + local.trailing_length() as u64)
    }
}

/// A zero-filled buffer of `size` bytes, or `OutOfMemory`.
fn zeroed(size: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| Error::OutOfMemory(size))?;
    buf.resize(size, 0);
    Ok(buf)
}
