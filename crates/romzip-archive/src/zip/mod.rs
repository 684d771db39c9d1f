//! On-disk ZIP records.
//!
//! Fixed-size parts of the classic (non-ZIP64) records, laid out exactly as
//! they appear in an archive. Each struct starts after the 4-byte signature;
//! the signature is read on its own so it can be checked before the record
//! is decoded.

mod central_dir;
mod eocd;
mod local;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub use central_dir::{flags, CentralDirectoryHeader};
pub use eocd::EocdRecord;
pub use local::LocalFileHeader;

/// A signed, fixed-size ZIP record.
pub trait Record: FromBytes + IntoBytes + Immutable + KnownLayout + Sized {
    /// Signature as a little-endian `u32`.
    const SIGNATURE: u32;

    /// Signature as it appears on disk.
    const MAGIC: [u8; 4] = Self::SIGNATURE.to_le_bytes();

    /// Record size including the signature.
    const SIZE: usize = 4 + std::mem::size_of::<Self>();
}

/// Compression methods this reader can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CompressionMethod {
    /// No compression (stored).
    Store = 0,
    /// Raw DEFLATE.
    Deflate = 8,
}

impl TryFrom<u16> for CompressionMethod {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Store),
            8 => Ok(Self::Deflate),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store => f.write_str("stored"),
            Self::Deflate => f.write_str("deflate"),
        }
    }
}
