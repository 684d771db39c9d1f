//! Bounds-checked cursor over a byte slice.
//!
//! ZIP records are little-endian and packed, so [`BinaryReader`] hands out
//! integers, raw byte runs, and whole zerocopy records. Nothing is copied
//! except the values returned.

use zerocopy::FromBytes;

use crate::{Error, Result};

/// Cursor over a borrowed byte slice.
///
/// A read that would run past the end fails with [`Error::UnexpectedEof`]
/// and leaves the position where it was.
///
/// # Example
///
/// ```
/// use romzip_common::BinaryReader;
///
/// let data = [0x50, 0x4b, 0x05, 0x06, 0x01, 0x00];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x06054b50);
/// assert_eq!(reader.read_u16().unwrap(), 1);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self::new_at(data, 0)
    }

    /// Start reading at `position` instead of the beginning.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Length of the whole slice, not just the unread part.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Unread bytes left after the position.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Everything from the position to the end.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        self.data.get(self.position..).unwrap_or_default()
    }

    /// The next `count` bytes, without consuming them.
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if available < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available,
            });
        }
        Ok(&self.remaining_bytes()[..count])
    }

    /// Consume the next `count` bytes.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Consume one packed record.
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let available = self.remaining();
        T::read_from_prefix(self.remaining_bytes())
            .map(|(record, _)| {
                self.position += size;
                record
            })
            .map_err(|_| Error::UnexpectedEof {
                needed: size,
                available,
            })
    }

    /// Consume `expected.len()` bytes and check they equal `expected`.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual == expected {
            Ok(())
        } else {
            Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            })
        }
    }
}
