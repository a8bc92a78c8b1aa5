//! The ZIM file facade: opening, identity, counts, and the mimetype list.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::io;

use super::checksum::CHECKSUM_LEN;
use super::error::Result;
use super::structures::{Header, Uuid};

/// An open ZIM file.
///
/// The facade owns the single file cursor and every read path re-seeks it
/// absolutely, so calls compose in any order. Operations that touch the
/// file take `&mut self`; the reader performs no internal locking, so
/// multi-threaded use requires an external mutex around the whole value.
/// Dropping the facade closes the file.
pub struct ZimFile {
    pub(crate) f: File,
    pub(crate) header: Header,
    pub(crate) mimetype_list: Vec<String>,
    pub(crate) metadata: HashMap<String, String>,
}

impl ZimFile {
    /// Opens `path`, validates the header, and reads the mimetype list and
    /// the metadata entries.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut f = File::open(path)?;
        io::seek_to(&mut f, 0)?;
        let header = Header::read_from(&mut f)?;
        let mut zim = ZimFile {
            f,
            header,
            mimetype_list: Vec::new(),
            metadata: HashMap::new(),
        };
        zim.read_mimetype_list()?;
        zim.read_metadata();
        Ok(zim)
    }

    /// Reads the NUL-terminated mimetype strings at `mime_list_pos`,
    /// stopping at the first empty one. Entries are trimmed and lowercased.
    fn read_mimetype_list(&mut self) -> Result<()> {
        io::seek_to(&mut self.f, self.header.mime_list_pos)?;
        loop {
            let raw = io::read_null_terminated(&mut self.f)?;
            if raw.is_empty() {
                break;
            }
            let mimetype = String::from_utf8_lossy(&raw);
            self.mimetype_list
                .push(mimetype.trim().to_ascii_lowercase());
        }
        Ok(())
    }

    /// Total number of directory entries in the pointer lists.
    pub fn article_count(&self) -> u32 {
        self.header.article_count
    }

    /// Number of clusters the archive contains.
    pub fn cluster_count(&self) -> u32 {
        self.header.cluster_count
    }

    /// Size of the archive in bytes: the checksum offset plus the
    /// trailing MD5 digest.
    pub fn filesize(&self) -> u64 {
        self.header.checksum_pos + CHECKSUM_LEN as u64
    }

    /// Unique id of the archive.
    pub fn uuid(&self) -> Uuid {
        self.header.uuid
    }

    /// Major and minor format version of the archive.
    pub fn version(&self) -> (u16, u16) {
        (self.header.major_version, self.header.minor_version)
    }

    /// The ordered mimetype list; article entries index into it through
    /// their mimetype field.
    pub fn mimetype_list(&self) -> &[String] {
        &self.mimetype_list
    }
}
