//! Romzip - ZIP archive reading for cartridge emulators.
//!
//! This crate provides a unified interface to the romzip crates.
//!
//! # Crates
//!
//! - [`romzip_common`] - Common utilities (binary reading, CRC-32, name matching)
//! - [`romzip_archive`] - ZIP reading (EOCD search, central directory, inflate, archive cache)
//!
//! # Example
//!
//! ```no_run
//! use romzip::prelude::*;
//!
//! let mut handler = ZipHandler::new();
//! handler.open("roms/activision.zip")?;
//!
//! if handler.rom_files() > 0 {
//!     while let Some(name) = handler.next_file() {
//!         let data = handler.decompress()?;
//!         println!("{}: {} bytes", name, data.len());
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use romzip_archive as archive;
pub use romzip_common as common;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use romzip_archive::{
        ArchiveCache, EntryHeader, Error, ErrorKind, HandlerOptions, ZipArchive, ZipHandler,
    };
    pub use romzip_common::{crc, BinaryReader};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(archive::DEFAULT_CACHE_CAPACITY, 8);
    }
}
