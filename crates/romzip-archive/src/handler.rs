//! High-level archive access for ROM loaders.
//!
//! [`ZipHandler`] keeps at most one archive checked out at a time. Opening
//! another path parks the current archive in the [`ArchiveCache`], so a
//! loader that hops between a few archives never re-parses them.

use std::fs::File;
use std::path::Path;

use romzip_common::crc;
use tracing::debug;

use crate::archive::ZipArchive;
use crate::cache::{ArchiveCache, DEFAULT_CACHE_CAPACITY};
use crate::entry::EntryHeader;
use crate::{Error, Result};

/// Handler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Number of closed archives kept open for reuse.
    pub cache_capacity: usize,
    /// Check the CRC-32 of every decompressed entry.
    pub verify_crc: bool,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            verify_crc: false,
        }
    }
}

/// Open, enumerate, and decompress ZIP archives through a shared cache.
///
/// # Example
///
/// ```no_run
/// use romzip_archive::ZipHandler;
///
/// let mut handler = ZipHandler::new();
/// handler.open("games/pitfall.zip")?;
///
/// while handler.has_next() {
///     let Some(name) = handler.next_file() else { break };
///     if name.ends_with(".a26") {
///         let image = handler.decompress()?;
///         println!("{}: {} bytes", name, image.len());
///     }
/// }
/// # Ok::<(), romzip_archive::Error>(())
/// ```
#[derive(Debug)]
pub struct ZipHandler {
    cache: ArchiveCache,
    current: Option<ZipArchive<File>>,
    header: Option<EntryHeader>,
    verify_crc: bool,
}

impl ZipHandler {
    pub fn new() -> Self {
        Self::with_options(HandlerOptions::default())
    }

    pub fn with_options(options: HandlerOptions) -> Self {
        Self {
            cache: ArchiveCache::new(options.cache_capacity),
            current: None,
            header: None,
            verify_crc: options.verify_crc,
        }
    }

    /// Make `path` the current archive.
    ///
    /// The previous archive goes back to the cache first. On failure no
    /// archive is current.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.close();

        let mut archive = self.cache.open(path)?;
        archive.reset();
        self.current = Some(archive);
        Ok(())
    }

    /// Return the current archive to the cache.
    pub fn close(&mut self) {
        self.header = None;
        if let Some(archive) = self.current.take() {
            debug!(path = %archive.path().display(), "closing archive");
            self.cache.close(archive);
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Restart enumeration of the current archive.
    pub fn reset(&mut self) {
        self.header = None;
        if let Some(archive) = self.current.as_mut() {
            archive.reset();
        }
    }

    /// Whether the central directory has unread records.
    ///
    /// The remaining records may all be filtered out, in which case
    /// [`next_file`](Self::next_file) still returns `None`.
    pub fn has_next(&self) -> bool {
        self.current.as_ref().is_some_and(ZipArchive::has_next)
    }

    /// Advance to the next listable entry and return its name.
    pub fn next_file(&mut self) -> Option<String> {
        let header = self.current.as_mut()?.next_entry();
        let name = header.as_ref().map(|h| h.filename.clone());
        self.header = header;
        name
    }

    /// The entry most recently returned by [`next_file`](Self::next_file).
    #[inline]
    pub fn current_entry(&self) -> Option<&EntryHeader> {
        self.header.as_ref()
    }

    /// Decompress the entry most recently returned by
    /// [`next_file`](Self::next_file).
    pub fn decompress(&mut self) -> Result<Vec<u8>> {
        let archive = self.current.as_mut().ok_or(Error::NoArchive)?;
        let header = self.header.as_ref().ok_or(Error::NoEntry)?;
        extract(archive, header, self.verify_crc)
    }

    /// Decompress the entry called `name`.
    ///
    /// An exact name match is preferred over an ASCII case-insensitive one.
    /// Enumeration state is not affected.
    pub fn decompress_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let archive = self.current.as_mut().ok_or(Error::NoArchive)?;
        let header = archive
            .find(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        extract(archive, &header, self.verify_crc)
    }

    /// Cartridge images in the current archive, or 0 if none is open.
    pub fn rom_files(&self) -> usize {
        self.current.as_ref().map_or(0, ZipArchive::rom_files)
    }

    /// Listable entries of the current archive.
    pub fn entries(&self) -> Vec<EntryHeader> {
        self.current
            .as_ref()
            .map(|archive| archive.entries().collect())
            .unwrap_or_default()
    }

    #[inline]
    pub fn current(&self) -> Option<&ZipArchive<File>> {
        self.current.as_ref()
    }

    #[inline]
    pub fn cache(&self) -> &ArchiveCache {
        &self.cache
    }

    /// Close every cached archive. The current archive stays open.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for ZipHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ZipHandler {
    fn drop(&mut self) {
        self.close();
        self.cache.clear();
    }
}

fn extract(archive: &mut ZipArchive<File>, header: &EntryHeader, verify_crc: bool) -> Result<Vec<u8>> {
    let data = archive.read(header)?;

    if verify_crc {
        let actual = crc::checksum(&data);
        if actual != header.crc32 {
            return Err(Error::CrcMismatch {
                expected: header.crc32,
                actual,
            });
        }
    }

    Ok(data)
}
