//! MD5 integrity verification against the digest embedded at the end of
//! the archive.

use std::io::Read;

use md5::{Digest, Md5};

use crate::io::seek_to;

use super::error::{Error, Result};
use super::file::ZimFile;

/// Width of the embedded MD5 digest.
pub(crate) const CHECKSUM_LEN: usize = 16;

const CHUNK_LEN: usize = 64 * 1024;

impl ZimFile {
    /// The precalculated MD5 digest embedded at `checksum_pos`.
    pub fn internal_checksum(&mut self) -> Result<[u8; CHECKSUM_LEN]> {
        seek_to(&mut self.f, self.header.checksum_pos)?;
        let mut sum = [0u8; CHECKSUM_LEN];
        self.f.read_exact(&mut sum)?;
        Ok(sum)
    }

    /// MD5 of the file contents up to the embedded digest. Streams the
    /// region in chunks; runtime is proportional to the file size.
    pub fn calculate_checksum(&mut self) -> Result<[u8; CHECKSUM_LEN]> {
        seek_to(&mut self.f, 0)?;
        let mut digest = Md5::new();
        let mut remaining = self.header.checksum_pos;
        let mut chunk = [0u8; CHUNK_LEN];
        while remaining > 0 {
            let want = CHUNK_LEN.min(remaining as usize);
            let got = self.f.read(&mut chunk[..want])?;
            if got == 0 {
                return Err(Error::Io(std::io::ErrorKind::UnexpectedEof.into()));
            }
            digest.update(&chunk[..got]);
            remaining -= got as u64;
        }
        Ok(digest.finalize().into())
    }

    /// Compares the embedded digest against a fresh calculation.
    pub fn validate_checksum(&mut self) -> Result<()> {
        if self.internal_checksum()? != self.calculate_checksum()? {
            return Err(Error::ChecksumMismatch);
        }
        Ok(())
    }
}
