//! Cluster access: streamed blob readers and fully materialized clusters.
//!
//! A cluster starts with an information byte (compression code in the low
//! nibble, offset width in bit 4) followed by the payload: `N + 1`
//! little-endian offsets relative to the payload start, then the `N`
//! blobs concatenated. Stored clusters are served straight from the file
//! with seeks; xz clusters are decoded through a forward-only stream, so
//! reaching a blob costs work proportional to its offset in the cluster.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use xz2::read::XzDecoder;

use crate::io::{seek_to, skip, PayloadSource};

use super::error::{Error, Result};
use super::file::ZimFile;
use super::structures::{DirectoryEntry, EntryKind};

const EXTENDED_OFFSET_SIZE: u8 = 8;

/// Hard ceiling on the byte range of a cluster that may be materialized.
const MAX_CLUSTER_LEN: u64 = 32 * 1024 * 1024;

/// Width in bytes of the blob offset table entries, from bit 4 of the
/// information byte.
pub(crate) fn cluster_offset_size(cluster_information: u8) -> u8 {
    4 << ((cluster_information & 16) >> 4)
}

/// Compression code from the low nibble of the information byte.
pub(crate) fn cluster_compression(cluster_information: u8) -> u8 {
    cluster_information & 15
}

/// Cluster payload served straight from the backing file.
pub(crate) struct StoredPayload<'a> {
    f: &'a mut File,
}

impl Read for StoredPayload<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.f.read(buf)
    }
}

impl PayloadSource for StoredPayload<'_> {
    fn advance(&mut self, n: u64) -> io::Result<()> {
        self.f.seek(SeekFrom::Current(n as i64)).map(|_| ())
    }
}

impl<'a> PayloadSource for XzDecoder<&'a mut File> {
    fn advance(&mut self, n: u64) -> io::Result<()> {
        skip(self, n)
    }
}

/// An open cluster payload, starting at byte 0 of the logical payload.
pub(crate) enum ClusterSource<'a> {
    Stored(StoredPayload<'a>),
    Xz(XzDecoder<&'a mut File>),
}

impl Read for ClusterSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ClusterSource::Stored(payload) => payload.read(buf),
            ClusterSource::Xz(decoder) => decoder.read(buf),
        }
    }
}

impl PayloadSource for ClusterSource<'_> {
    fn advance(&mut self, n: u64) -> io::Result<()> {
        match self {
            ClusterSource::Stored(payload) => payload.advance(n),
            ClusterSource::Xz(decoder) => decoder.advance(n),
        }
    }
}

/// Positions `source` at the first byte of blob `blob_position` and
/// returns the blob length. The source must sit at byte 0 of the payload.
fn position_at_blob<S: PayloadSource>(
    source: &mut S,
    offset_size: u8,
    blob_position: u32,
) -> Result<u64> {
    let offset_size = u64::from(offset_size);
    let this_blob_index = u64::from(blob_position) * offset_size;
    source.advance(this_blob_index)?;
    let (this_blob_pointer, next_blob_pointer) = if offset_size == u64::from(EXTENDED_OFFSET_SIZE)
    {
        (
            source.read_u64::<LittleEndian>()?,
            source.read_u64::<LittleEndian>()?,
        )
    } else {
        (
            u64::from(source.read_u32::<LittleEndian>()?),
            u64::from(source.read_u32::<LittleEndian>()?),
        )
    };
    if next_blob_pointer < this_blob_pointer {
        return Err(Error::InvalidBlobIndex);
    }
    let already_read = this_blob_index + 2 * offset_size;
    let gap = this_blob_pointer
        .checked_sub(already_read)
        .ok_or(Error::InvalidBlobIndex)?;
    source.advance(gap)?;
    Ok(next_blob_pointer - this_blob_pointer)
}

/// Streaming reader over a single blob; yields exactly [`size`] bytes.
///
/// The reader borrows the facade's file cursor (and, for xz clusters, its
/// decoder stream) for its lifetime. Drain or drop it before issuing the
/// next facade call; long-lived buffers are better served by
/// [`ZimFile::cluster_at`].
///
/// [`size`]: BlobReader::size
pub struct BlobReader<'a> {
    inner: io::Take<ClusterSource<'a>>,
    size: u64,
}

impl BlobReader<'_> {
    /// Exact number of bytes the reader yields in total.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Read for BlobReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// A fully materialized cluster: the payload held uncompressed in memory.
///
/// Materializing pays the whole decompression once, which is the cheaper
/// shape when every blob of a cluster is going to be read. Single-blob
/// access is better served by [`ZimFile::blob_reader_at`].
pub struct Cluster {
    data: Vec<u8>,
    position: u32,
    information: u8,
}

impl Cluster {
    /// Position of this cluster in the cluster pointer list.
    pub fn position(&self) -> u32 {
        self.position
    }

    /// True when the on-disk cluster was stored compressed.
    pub fn was_compressed(&self) -> bool {
        cluster_compression(self.information) > 1
    }

    /// The blob at `blob_position`, as a slice of the materialized
    /// payload. Iteration past the last blob yields an error.
    pub fn blob_at(&self, blob_position: u32) -> Result<&[u8]> {
        let offset_size = u64::from(cluster_offset_size(self.information));
        let this_blob_index = u64::from(blob_position) * offset_size;
        let next_blob_index = this_blob_index + offset_size;
        if next_blob_index + offset_size > self.data.len() as u64 {
            return Err(Error::InvalidBlobPosition);
        }
        let this_blob_pointer = self.offset_at(this_blob_index as usize);
        let next_blob_pointer = self.offset_at(next_blob_index as usize);
        if next_blob_pointer >= this_blob_pointer && next_blob_pointer <= self.data.len() as u64 {
            Ok(&self.data[this_blob_pointer as usize..next_blob_pointer as usize])
        } else {
            Err(Error::InvalidBlobIndex)
        }
    }

    fn offset_at(&self, index: usize) -> u64 {
        if cluster_offset_size(self.information) == EXTENDED_OFFSET_SIZE {
            LittleEndian::read_u64(&self.data[index..index + 8])
        } else {
            u64::from(LittleEndian::read_u32(&self.data[index..index + 4]))
        }
    }
}

impl ZimFile {
    /// Opens cluster `cluster_position` as a payload source positioned at
    /// byte 0 of the logical payload, together with the information byte.
    pub(crate) fn cluster_source(
        &mut self,
        cluster_position: u32,
    ) -> Result<(ClusterSource<'_>, u8)> {
        if cluster_position >= self.header.cluster_count {
            return Err(Error::InvalidClusterPosition);
        }
        let cluster_pointer = self.cluster_pointer_at(cluster_position)?;
        seek_to(&mut self.f, cluster_pointer)?;
        let cluster_information = self.f.read_u8()?;
        match cluster_compression(cluster_information) {
            0 | 1 => Ok((
                ClusterSource::Stored(StoredPayload { f: &mut self.f }),
                cluster_information,
            )),
            // a fresh single-stream decoder stops at the xz stream end
            4 => Ok((
                ClusterSource::Xz(XzDecoder::new(&mut self.f)),
                cluster_information,
            )),
            // 2 (zlib) and 3 (bzip2) are legacy codes, not supported
            other => Err(Error::UnsupportedCompression(other)),
        }
    }

    /// Byte length of cluster `cluster_position`, bounded above by the
    /// next cluster pointer or, for the last cluster, the checksum
    /// offset. The information byte is not counted.
    fn cluster_len(&mut self, cluster_position: u32) -> Result<u64> {
        let cluster_pointer = self.cluster_pointer_at(cluster_position)?;
        let next_cluster_pointer = if cluster_position + 1 >= self.header.cluster_count {
            self.header.checksum_pos
        } else {
            self.cluster_pointer_at(cluster_position + 1)?
        };
        Ok(next_cluster_pointer
            .saturating_sub(cluster_pointer)
            .saturating_sub(1))
    }

    /// Streaming reader for the blob at the given cluster and blob
    /// positions.
    pub fn blob_reader_at(
        &mut self,
        cluster_position: u32,
        blob_position: u32,
    ) -> Result<BlobReader<'_>> {
        let (mut source, cluster_information) = self.cluster_source(cluster_position)?;
        let offset_size = cluster_offset_size(cluster_information);
        let size = position_at_blob(&mut source, offset_size, blob_position)?;
        Ok(BlobReader {
            inner: source.take(size),
            size,
        })
    }

    /// Streaming reader for the blob of an article entry. Redirects,
    /// link targets, and tombstones carry no blob.
    pub fn blob_reader(&mut self, entry: &DirectoryEntry) -> Result<BlobReader<'_>> {
        match entry.kind {
            EntryKind::Article {
                cluster_number,
                blob_number,
            } => self.blob_reader_at(cluster_number, blob_number),
            _ => Err(Error::InvalidBlobPosition),
        }
    }

    /// Materializes cluster `cluster_position` fully in memory. Clusters
    /// whose byte range is empty or exceeds 32 MiB are rejected.
    pub fn cluster_at(&mut self, cluster_position: u32) -> Result<Cluster> {
        if cluster_position >= self.header.cluster_count {
            return Err(Error::InvalidClusterPosition);
        }
        let cluster_len = self.cluster_len(cluster_position)?;
        if cluster_len == 0 || cluster_len > MAX_CLUSTER_LEN {
            return Err(Error::InvalidClusterSize);
        }
        let (source, information) = self.cluster_source(cluster_position)?;
        let data = match source {
            ClusterSource::Stored(mut payload) => {
                let mut buf = vec![0u8; cluster_len as usize];
                payload.read_exact(&mut buf)?;
                buf
            }
            ClusterSource::Xz(mut decoder) => {
                let mut buf = Vec::new();
                decoder.read_to_end(&mut buf)?;
                buf
            }
        };
        Ok(Cluster {
            data,
            position: cluster_position,
            information,
        })
    }
}
