//! Cache of recently closed archives.
//!
//! Loaders often probe the same archive repeatedly. Closing an archive parks
//! it here, central directory and file handle included, and reopening the same
//! path takes it back out without touching the disk. The least recently
//! closed archive is dropped once the cache is full.

use std::fs::File;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use lru::LruCache;
use tracing::debug;

use crate::archive::ZipArchive;
use crate::Result;

/// Number of closed archives kept by default.
pub const DEFAULT_CACHE_CAPACITY: usize = 8;

/// Bounded most-recently-closed cache of open archives, keyed by path.
///
/// Paths are compared as given, component by component. They are not
/// canonicalized, so `roms/../game.zip` and `game.zip` are different keys.
pub struct ArchiveCache {
    entries: LruCache<PathBuf, ZipArchive<File>>,
}

impl ArchiveCache {
    /// Create a cache holding up to `capacity` archives.
    ///
    /// A capacity of zero falls back to [`DEFAULT_CACHE_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Take the archive for `path` out of the cache, or open it from disk.
    ///
    /// Either way enumeration starts at the first entry. A failed open
    /// leaves the cache unchanged.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<ZipArchive<File>> {
        let path = path.as_ref();
        if let Some(mut archive) = self.entries.pop(path) {
            debug!(path = %path.display(), "archive cache hit");
            archive.reset();
            return Ok(archive);
        }

        debug!(path = %path.display(), "archive cache miss");
        ZipArchive::open(path)
    }

    /// Park a closed archive as the most recently closed entry.
    pub fn close(&mut self, archive: ZipArchive<File>) {
        let path = archive.path().to_path_buf();
        if let Some((evicted, _)) = self.entries.push(path.clone(), archive) {
            if evicted != path {
                debug!(path = %evicted.display(), "evicted archive from cache");
            }
        }
    }

    /// Whether an archive for `path` is parked here.
    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        self.entries.contains(path.as_ref())
    }

    /// Cached paths, most recently closed first.
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.entries.iter().map(|(path, _)| path.as_path())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Drop every cached archive, closing its file handle.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ArchiveCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for ArchiveCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveCache")
            .field("capacity", &self.capacity())
            .field("paths", &self.paths().collect::<Vec<_>>())
            .finish()
    }
}
