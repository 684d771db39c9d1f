//! Positioned reads from seekable byte sources.

use std::io::{self, Read, Seek, SeekFrom};

/// Read up to `buf.len()` bytes starting at `offset`.
///
/// Keeps reading until the buffer is full or the source reports end of file,
/// and returns how many bytes were actually read. A short count is not an
/// error here; callers decide whether it means truncation.
pub(crate) fn read_at<R: Read + Seek>(source: &mut R, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
    source.seek(SeekFrom::Start(offset))?;

    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}
