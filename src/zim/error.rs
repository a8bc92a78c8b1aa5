//! Error type of the ZIM reader.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while reading a ZIM file.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying file read or seek failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the ZIM magic number.
    #[error("file has no ZIM header")]
    BadMagic,

    /// The major format version is not one this reader supports.
    #[error("unsupported ZIM version {0}")]
    UnsupportedVersion(u16),

    /// The header records no main page.
    #[error("no main page specified in ZIM file")]
    NoMainPage,

    /// The header records no layout page.
    #[error("no layout page specified in ZIM file")]
    NoLayoutPage,

    /// Cluster position at or past the cluster count.
    #[error("invalid cluster position")]
    InvalidClusterPosition,

    /// Cluster byte range is empty or exceeds the materialization cap.
    #[error("invalid cluster size")]
    InvalidClusterSize,

    /// Compression code other than stored or xz.
    #[error("unsupported cluster compression {0}")]
    UnsupportedCompression(u8),

    /// Blob position outside the cluster's offset table.
    #[error("invalid blob position")]
    InvalidBlobPosition,

    /// Blob offsets are decreasing or point outside the payload.
    #[error("invalid blob index")]
    InvalidBlobIndex,

    /// Entry position at or past the article count.
    #[error("position out of range")]
    PositionOutOfRange,

    /// Redirect resolution requested for a non-redirect entry.
    #[error("directory entry is not a redirect")]
    NotRedirect,

    /// None of the conventional favicon locations exist.
    #[error("favicon not found")]
    FaviconNotFound,

    /// The embedded MD5 does not match the file contents.
    #[error("checksum mismatch")]
    ChecksumMismatch,
}
