//! Read-only ZIP archive reader for cartridge loaders.
//!
//! Handles the classic single-disk ZIP format:
//!
//! - End of Central Directory search behind comments of up to 65535 bytes
//! - Central directory enumeration with junk-entry filtering
//! - Stored (method 0) and raw DEFLATE (method 8) entries
//! - A bounded cache of recently closed archives
//!
//! ZIP64, encryption, multi-disk archives, and writing are not supported.
//!
//! # Example
//!
//! ```no_run
//! use romzip_archive::ZipArchive;
//!
//! let mut archive = ZipArchive::open("games.zip")?;
//! println!("{} cartridge images", archive.rom_files());
//!
//! while let Some(entry) = archive.next_entry() {
//!     if entry.has_rom_extension() {
//!         let data = archive.read(&entry)?;
//!         println!("{}: {} bytes", entry.filename, data.len());
//!     }
//! }
//! # Ok::<(), romzip_archive::Error>(())
//! ```

mod archive;
mod cache;
mod decompress;
mod directory;
mod entry;
mod error;
mod handler;
mod locate;
mod source;
pub mod zip;

#[cfg(test)]
mod testutil;

pub use archive::ZipArchive;
pub use cache::{ArchiveCache, DEFAULT_CACHE_CAPACITY};
pub use decompress::INFLATE_CHUNK_SIZE;
pub use directory::{CentralDirectory, Headers};
pub use entry::{EntryHeader, MACOS_METADATA_PREFIX, ROM_EXTENSIONS};
pub use error::{Error, ErrorKind, Result};
pub use handler::{HandlerOptions, ZipHandler};
pub use locate::{locate, EndOfCentralDirectory, ECD_INITIAL_WINDOW, ECD_MAX_WINDOW, MAX_COMMENT_LENGTH};
