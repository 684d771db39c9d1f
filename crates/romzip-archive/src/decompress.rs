//! Entry decompression.
//!
//! Stored entries are copied straight from the archive. Deflated entries are
//! inflated as a raw DEFLATE stream (no zlib header), fed from the archive in
//! fixed-size chunks so memory use does not depend on the entry size.

use std::io::{Read, Seek};

use flate2::{Decompress, FlushDecompress, Status};
use tracing::trace;

use crate::source::read_at;
use crate::{Error, Result};

/// Bytes of compressed input read from the archive per inflate step.
pub const INFLATE_CHUNK_SIZE: usize = 16 * 1024;

/// Upper bound on how far DEFLATE can expand its input.
pub(crate) const MAX_DEFLATE_RATIO: u64 = 1032;

/// Copy a stored entry into `out`.
///
/// Reads exactly `out.len()` bytes from `offset`.
pub fn read_stored<R: Read + Seek>(source: &mut R, offset: u64, out: &mut [u8]) -> Result<usize> {
    let read = read_at(source, offset, out)?;
    if read != out.len() {
        return Err(Error::FileTruncated {
            expected: out.len() as u64,
            actual: read as u64,
        });
    }
    Ok(read)
}

/// Inflate a raw DEFLATE stream of `compressed_length` bytes at `offset`.
///
/// `out` must be exactly the declared uncompressed size; the stream has to
/// fill it completely and end within the declared input.
pub fn inflate_raw<R: Read + Seek>(
    source: &mut R,
    offset: u64,
    compressed_length: u64,
    out: &mut [u8],
) -> Result<usize> {
    let mut inflater = Decompress::new(false);
    // One spare byte for the end-of-input padding below.
    let mut scratch = vec![0u8; INFLATE_CHUNK_SIZE + 1];
    let mut offset = offset;
    let mut input_remaining = compressed_length;

    loop {
        let wanted = input_remaining.min(INFLATE_CHUNK_SIZE as u64) as usize;
        let read = read_at(source, offset, &mut scratch[..wanted])?;
        offset += read as u64;

        if read == 0 && input_remaining > 0 {
            return Err(Error::FileTruncated {
                expected: compressed_length,
                actual: compressed_length - input_remaining,
            });
        }
        input_remaining -= read as u64;

        // Some encoders never set the final-block flag; one padding byte past
        // the declared input lets the inflater flush and report the end.
        let mut available = read;
        if input_remaining == 0 {
            scratch[read] = 0;
            available += 1;
        }

        trace!(read, input_remaining, "inflating chunk");
        let status = inflate_chunk(&mut inflater, &scratch[..available], out)?;
        if status == Status::StreamEnd {
            break;
        }
        if input_remaining == 0 {
            return Err(Error::Decompression(
                "deflate stream did not end within the declared input".to_string(),
            ));
        }
    }

    let produced = inflater.total_out() as usize;
    if input_remaining > 0 || produced != out.len() {
        return Err(Error::Decompression(format!(
            "deflate stream ended early: {} of {} bytes produced, {} input bytes unused",
            produced,
            out.len(),
            input_remaining
        )));
    }

    Ok(produced)
}

/// Feed one chunk to the inflater until it is consumed or the stream ends.
fn inflate_chunk(inflater: &mut Decompress, mut input: &[u8], out: &mut [u8]) -> Result<Status> {
    loop {
        let in_before = inflater.total_in();
        let out_before = inflater.total_out();

        let status = inflater
            .decompress(input, &mut out[out_before as usize..], FlushDecompress::None)
            .map_err(|e| Error::Decompression(e.to_string()))?;

        let consumed = (inflater.total_in() - in_before) as usize;
        input = &input[consumed..];
        let progressed = consumed > 0 || inflater.total_out() > out_before;

        match status {
            Status::StreamEnd => return Ok(status),
            _ if input.is_empty() => return Ok(status),
            _ if progressed => continue,
            // Output is full or the stream is stuck with input left over.
            _ => {
                return Err(Error::Decompression(
                    "deflate stream produces more data than declared".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::testutil::deflate;

    fn inflate_bytes(compressed: &[u8], size: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; size];
        let mut source = Cursor::new(compressed.to_vec());
        let written = inflate_raw(&mut source, 0, compressed.len() as u64, &mut out)?;
        assert_eq!(written, size);
        Ok(out)
    }

    #[test]
    fn test_deflate_roundtrip() {
        let original = b"Hello, World! This is a test of DEFLATE compression.";
        let compressed = deflate(original);

        assert_eq!(inflate_bytes(&compressed, original.len()).unwrap(), original);
    }

    #[test]
    fn test_multi_chunk_input() {
        // Incompressible data so the compressed stream spans several chunks.
        let mut state = 0x1234_5678u32;
        let original: Vec<u8> = (0..3 * INFLATE_CHUNK_SIZE)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();
        let compressed = deflate(&original);
        assert!(compressed.len() > 2 * INFLATE_CHUNK_SIZE);

        assert_eq!(inflate_bytes(&compressed, original.len()).unwrap(), original);
    }

    #[test]
    fn test_inflate_at_offset() {
        let original = b"cartridge image bytes ".repeat(50);
        let compressed = deflate(&original);
        let mut file = vec![0xAAu8; 100];
        file.extend_from_slice(&compressed);
        file.extend_from_slice(&[0xBB; 10]);

        let mut out = vec![0u8; original.len()];
        let mut source = Cursor::new(file);
        inflate_raw(&mut source, 100, compressed.len() as u64, &mut out).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_declared_size_too_large() {
        let original = b"short".repeat(10);
        let compressed = deflate(&original);

        let err = inflate_bytes(&compressed, original.len() + 1).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
    }

    #[test]
    fn test_declared_size_too_small() {
        let original = b"short".repeat(10);
        let compressed = deflate(&original);

        let err = inflate_bytes(&compressed, original.len() - 1).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
    }

    #[test]
    fn test_truncated_input() {
        let original = b"some data to compress ".repeat(20);
        let compressed = deflate(&original);

        let mut source = Cursor::new(compressed[..compressed.len() / 2].to_vec());
        let mut out = vec![0u8; original.len()];
        let err = inflate_raw(&mut source, 0, compressed.len() as u64, &mut out).unwrap_err();
        assert!(matches!(err, Error::FileTruncated { .. } | Error::Decompression(_)));
    }

    #[test]
    fn test_garbage_input() {
        // Block type 0b11 is reserved and always invalid.
        let err = inflate_bytes(&[0xFF, 0xFF, 0xFF, 0xFF], 16).unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
    }

    #[test]
    fn test_read_stored() {
        let mut source = Cursor::new(b"..stored..".to_vec());
        let mut out = [0u8; 6];
        assert_eq!(read_stored(&mut source, 2, &mut out).unwrap(), 6);
        assert_eq!(&out, b"stored");

        let mut out = [0u8; 20];
        let err = read_stored(&mut source, 2, &mut out).unwrap_err();
        assert!(matches!(err, Error::FileTruncated { expected: 20, actual: 8 }));
    }
}
