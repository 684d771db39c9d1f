//! CRC-32 checksum utilities.
//!
//! ZIP archives store the CRC-32 (IEEE 802.3 polynomial) of every entry's
//! uncompressed contents in its headers.

/// Compute the CRC-32 of a byte slice.
#[inline]
pub fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
