//! Passive data structures of the ZIM container format.

use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt;
use std::io::Read;

use super::error::{Error, Result};

/// Magic number identifying a ZIM file.
pub const MAGIC_NUMBER: u32 = 72_173_914;

/// Header sentinel marking the absence of a main page.
pub const NO_MAIN_PAGE: u32 = u32::MAX;
/// Header sentinel marking the absence of a layout page.
pub const NO_LAYOUT_PAGE: u32 = u32::MAX;

/// Fixed mimetype value of a deletion tombstone.
pub const MIMETYPE_DELETED_ENTRY: u16 = 0xFFFD;
/// Fixed mimetype value of a link target.
pub const MIMETYPE_LINK_TARGET: u16 = 0xFFFE;
/// Fixed mimetype value of a redirect.
pub const MIMETYPE_REDIRECT_ENTRY: u16 = 0xFFFF;

/// Unique id of a ZIM file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uuid([u8; 16]);

impl Uuid {
    /// The raw 16 bytes of the id.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(bytes: [u8; 16]) -> Self {
        Uuid(bytes)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// A single ASCII byte partitioning the directory into role-specific
/// regions. Namespaces outside the documented set pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace(pub u8);

impl Namespace {
    /// Layout resources: the layout page, CSS, the favicon, scripts.
    pub const LAYOUT: Namespace = Namespace(b'-');
    /// Article contents.
    pub const ARTICLES: Namespace = Namespace(b'A');
    /// Article metadata.
    pub const ARTICLE_METADATA: Namespace = Namespace(b'B');
    /// Images and other embedded files.
    pub const IMAGES_FILES: Namespace = Namespace(b'I');
    /// Image text descriptions.
    pub const IMAGES_TEXT: Namespace = Namespace(b'J');
    /// Archive metadata entries.
    pub const ZIM_METADATA: Namespace = Namespace(b'M');
    /// Category text.
    pub const CATEGORIES_TEXT: Namespace = Namespace(b'U');
    /// Article lists per category.
    pub const CATEGORIES_ARTICLE_LIST: Namespace = Namespace(b'V');
    /// Category lists per article.
    pub const CATEGORIES_PER_ARTICLE: Namespace = Namespace(b'W');
    /// Xapian fulltext index, exposed as opaque entries only.
    pub const FULLTEXT_INDEX: Namespace = Namespace(b'X');

    /// The underlying ASCII byte.
    pub fn as_byte(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 as char)
    }
}

/// Fixed 80-byte record at the start of every ZIM file.
#[derive(Debug, Clone)]
pub struct Header {
    /// Must equal [`MAGIC_NUMBER`].
    pub magic_number: u32,
    /// Major format version; 5 and 6 are accepted.
    pub major_version: u16,
    /// Minor format version, informational.
    pub minor_version: u16,
    /// Archive identity.
    pub uuid: Uuid,
    /// Number of entries in both pointer lists.
    pub article_count: u32,
    /// Number of clusters.
    pub cluster_count: u32,
    /// Offset of the URL-ordered pointer list (u64 entries).
    pub url_ptr_pos: u64,
    /// Offset of the title-ordered pointer list (u32 entries).
    pub title_ptr_pos: u64,
    /// Offset of the cluster pointer list (u64 entries).
    pub cluster_ptr_pos: u64,
    /// Offset of the mimetype list; also the header size.
    pub mime_list_pos: u64,
    /// URL-list index of the main page, or [`NO_MAIN_PAGE`].
    pub main_page: u32,
    /// URL-list index of the layout page, or [`NO_LAYOUT_PAGE`].
    pub layout_page: u32,
    /// Offset of the embedded 16-byte MD5; always 16 bytes before the end
    /// of the file.
    pub checksum_pos: u64,
}

impl Header {
    /// Decodes the fixed header from the start of `r`, validating the
    /// magic number and the major version.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let magic_number = r.read_u32::<LittleEndian>()?;
        if magic_number != MAGIC_NUMBER {
            return Err(Error::BadMagic);
        }
        let major_version = r.read_u16::<LittleEndian>()?;
        let minor_version = r.read_u16::<LittleEndian>()?;
        let mut uuid = [0u8; 16];
        r.read_exact(&mut uuid)?;
        let header = Header {
            magic_number,
            major_version,
            minor_version,
            uuid: uuid.into(),
            article_count: r.read_u32::<LittleEndian>()?,
            cluster_count: r.read_u32::<LittleEndian>()?,
            url_ptr_pos: r.read_u64::<LittleEndian>()?,
            title_ptr_pos: r.read_u64::<LittleEndian>()?,
            cluster_ptr_pos: r.read_u64::<LittleEndian>()?,
            mime_list_pos: r.read_u64::<LittleEndian>()?,
            main_page: r.read_u32::<LittleEndian>()?,
            layout_page: r.read_u32::<LittleEndian>()?,
            checksum_pos: r.read_u64::<LittleEndian>()?,
        };
        match header.major_version {
            5 | 6 => Ok(header),
            v => Err(Error::UnsupportedVersion(v)),
        }
    }
}

/// Payload location or redirect target of a directory entry,
/// discriminated by the mimetype sentinel range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular content entry addressing one blob in one cluster.
    Article {
        /// Cluster holding the entry's blob.
        cluster_number: u32,
        /// Blob index inside that cluster.
        blob_number: u32,
    },
    /// Alias for another entry, identified by URL pointer list index.
    Redirect {
        /// Position of the target in the URL pointer list.
        redirect_index: u32,
    },
    /// Link target; carries no payload.
    LinkTarget,
    /// Deletion tombstone; carries no payload.
    Deleted,
}

/// One named resource in the directory: an article, a redirect, a link
/// target, or a deletion tombstone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub(crate) mimetype: u16,
    pub(crate) namespace: Namespace,
    pub(crate) revision: u32,
    pub(crate) kind: EntryKind,
    pub(crate) url: Vec<u8>,
    pub(crate) title: Vec<u8>,
}

impl DirectoryEntry {
    /// Index into the archive's mimetype list, or one of the fixed
    /// sentinel values.
    pub fn mimetype(&self) -> u16 {
        self.mimetype
    }

    /// Namespace the entry belongs to.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Revision of the entry contents in the original history.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Payload location or redirect target.
    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// URL of the entry, unique within its namespace.
    pub fn url(&self) -> &[u8] {
        &self.url
    }

    /// Title of the entry; falls back to the URL when the stored title is
    /// empty.
    pub fn title(&self) -> &[u8] {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    /// Cluster holding the entry's blob, for article entries.
    pub fn cluster_number(&self) -> Option<u32> {
        match self.kind {
            EntryKind::Article { cluster_number, .. } => Some(cluster_number),
            _ => None,
        }
    }

    /// Blob index inside the entry's cluster, for article entries.
    pub fn blob_number(&self) -> Option<u32> {
        match self.kind {
            EntryKind::Article { blob_number, .. } => Some(blob_number),
            _ => None,
        }
    }

    /// URL pointer list position of the redirect target, for redirects.
    pub fn redirect_index(&self) -> Option<u32> {
        match self.kind {
            EntryKind::Redirect { redirect_index } => Some(redirect_index),
            _ => None,
        }
    }

    /// True for content entries in the article namespace.
    pub fn is_article(&self) -> bool {
        self.namespace == Namespace::ARTICLES && matches!(self.kind, EntryKind::Article { .. })
    }

    /// True for redirects to another entry.
    pub fn is_redirect(&self) -> bool {
        matches!(self.kind, EntryKind::Redirect { .. })
    }

    /// True for link targets.
    pub fn is_link_target(&self) -> bool {
        matches!(self.kind, EntryKind::LinkTarget)
    }

    /// True for deletion tombstones.
    pub fn is_deleted(&self) -> bool {
        matches!(self.kind, EntryKind::Deleted)
    }

    /// Inert placeholder returned by searches that never probed an entry.
    pub(crate) fn empty() -> Self {
        DirectoryEntry {
            mimetype: MIMETYPE_DELETED_ENTRY,
            namespace: Namespace(0),
            revision: 0,
            kind: EntryKind::Deleted,
            url: Vec::new(),
            title: Vec::new(),
        }
    }
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DirectoryEntry{{Namespace: {}, Title: {}, URL: {}}}",
            self.namespace,
            String::from_utf8_lossy(self.title()),
            String::from_utf8_lossy(&self.url),
        )
    }
}
