//! Low-level byte access for the ZIM reader.
//!
//! Everything the reader learns about an archive flows through these
//! primitives: absolute seeks, NUL-terminated byte strings, and the
//! forward-only skip used when a cluster payload arrives through a
//! decompressor instead of the seekable backing file.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

/// Chunk size used when scanning for the terminating NUL of a string.
const NUL_SCAN_CHUNK: usize = 256;

/// A byte source positioned inside a cluster payload.
///
/// Stored clusters are served by the seekable backing file, decompressed
/// clusters by a forward-only decoder. Blob addressing is written once
/// against this trait and specialized per backend: `advance` is a relative
/// seek on the file and a discard loop on the decoder.
pub(crate) trait PayloadSource: Read {
    /// Moves the cursor `n` bytes forward from its current position.
    fn advance(&mut self, n: u64) -> io::Result<()>;
}

/// Positions the file cursor at an absolute byte offset.
pub(crate) fn seek_to(f: &mut File, position: u64) -> io::Result<()> {
    f.seek(SeekFrom::Start(position)).map(|_| ())
}

/// Reads bytes up to and including the next NUL, returning the bytes
/// before it. The file cursor ends up just past the NUL.
pub(crate) fn read_null_terminated(f: &mut File) -> io::Result<Vec<u8>> {
    let start = f.stream_position()?;
    let mut result = Vec::new();
    let mut chunk = [0u8; NUL_SCAN_CHUNK];
    loop {
        let n = f.read(&mut chunk)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unterminated string",
            ));
        }
        if let Some(nul) = chunk[..n].iter().position(|&b| b == 0) {
            result.extend_from_slice(&chunk[..nul]);
            seek_to(f, start + result.len() as u64 + 1)?;
            return Ok(result);
        }
        result.extend_from_slice(&chunk[..n]);
    }
}

/// Discards exactly `n` bytes from a forward-only reader.
pub(crate) fn skip<R: Read>(r: &mut R, n: u64) -> io::Result<()> {
    let discarded = io::copy(&mut r.by_ref().take(n), &mut io::sink())?;
    if discarded < n {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(())
}
