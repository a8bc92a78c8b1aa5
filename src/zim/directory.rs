//! Decoding directory entries and resolving the pages the header and
//! conventions point at.

use byteorder::{LittleEndian, ReadBytesExt};

use crate::io;

use super::error::{Error, Result};
use super::file::ZimFile;
use super::structures::{
    DirectoryEntry, EntryKind, Namespace, MIMETYPE_DELETED_ENTRY, MIMETYPE_LINK_TARGET,
    MIMETYPE_REDIRECT_ENTRY, NO_LAYOUT_PAGE, NO_MAIN_PAGE,
};

/// How many redirects an internal lookup follows before giving up and
/// returning the redirect entry itself.
const REDIRECT_LIMIT: u8 = 4;

impl ZimFile {
    /// File offset of the entry at `position` in the URL-ordered list.
    ///
    /// Callers gate `position` on the article count.
    pub(crate) fn url_pointer_at(&mut self, position: u32) -> Result<u64> {
        io::seek_to(
            &mut self.f,
            self.header.url_ptr_pos + 8 * u64::from(position),
        )?;
        Ok(self.f.read_u64::<LittleEndian>()?)
    }

    /// File offset of the entry at `position` in the title-ordered list.
    /// The title list stores URL-list indices, so this costs two reads.
    pub(crate) fn title_pointer_at(&mut self, position: u32) -> Result<u64> {
        io::seek_to(
            &mut self.f,
            self.header.title_ptr_pos + 4 * u64::from(position),
        )?;
        let url_index = self.f.read_u32::<LittleEndian>()?;
        self.url_pointer_at(url_index)
    }

    /// File offset of cluster `position`.
    pub(crate) fn cluster_pointer_at(&mut self, position: u32) -> Result<u64> {
        io::seek_to(
            &mut self.f,
            self.header.cluster_ptr_pos + 8 * u64::from(position),
        )?;
        Ok(self.f.read_u64::<LittleEndian>()?)
    }

    /// Decodes the directory entry at `file_position`. Redirects are
    /// followed up to `max_redirects` deep; with a budget of 0 the
    /// redirect entry itself is returned.
    ///
    /// The parameter tail after the title is left unread.
    pub(crate) fn read_entry(
        &mut self,
        file_position: u64,
        max_redirects: u8,
    ) -> Result<DirectoryEntry> {
        io::seek_to(&mut self.f, file_position)?;
        let mimetype = self.f.read_u16::<LittleEndian>()?;
        let _parameter_len = self.f.read_u8()?;
        let namespace = Namespace(self.f.read_u8()?);
        let revision = self.f.read_u32::<LittleEndian>()?;
        let kind = match mimetype {
            MIMETYPE_DELETED_ENTRY => EntryKind::Deleted,
            MIMETYPE_LINK_TARGET => EntryKind::LinkTarget,
            MIMETYPE_REDIRECT_ENTRY => {
                let redirect_index = self.f.read_u32::<LittleEndian>()?;
                if max_redirects > 0 {
                    let target = self.url_pointer_at(redirect_index)?;
                    return self.read_entry(target, max_redirects - 1);
                }
                EntryKind::Redirect { redirect_index }
            }
            _ => {
                let cluster_number = self.f.read_u32::<LittleEndian>()?;
                let blob_number = self.f.read_u32::<LittleEndian>()?;
                EntryKind::Article {
                    cluster_number,
                    blob_number,
                }
            }
        };
        let url = io::read_null_terminated(&mut self.f)?;
        let title = io::read_null_terminated(&mut self.f)?;
        Ok(DirectoryEntry {
            mimetype,
            namespace,
            revision,
            kind,
            url,
            title,
        })
    }

    /// The entry at `position` in the URL-ordered pointer list.
    /// Redirects are not followed.
    pub fn entry_at_url_position(&mut self, position: u32) -> Result<DirectoryEntry> {
        if position >= self.header.article_count {
            return Err(Error::PositionOutOfRange);
        }
        let offset = self.url_pointer_at(position)?;
        self.read_entry(offset, 0)
    }

    /// The entry at `position` in the title-ordered pointer list.
    /// Redirects are not followed.
    pub fn entry_at_title_position(&mut self, position: u32) -> Result<DirectoryEntry> {
        if position >= self.header.article_count {
            return Err(Error::PositionOutOfRange);
        }
        let offset = self.title_pointer_at(position)?;
        self.read_entry(offset, 0)
    }

    /// Resolves a redirect entry to its target, following chained
    /// redirects up to the internal depth limit.
    pub fn follow_redirect(&mut self, entry: &DirectoryEntry) -> Result<DirectoryEntry> {
        let EntryKind::Redirect { redirect_index } = entry.kind else {
            return Err(Error::NotRedirect);
        };
        let offset = self.url_pointer_at(redirect_index)?;
        self.read_entry(offset, REDIRECT_LIMIT)
    }

    /// The main page recorded in the header.
    pub fn main_page(&mut self) -> Result<DirectoryEntry> {
        if self.header.main_page == NO_MAIN_PAGE {
            return Err(Error::NoMainPage);
        }
        let offset = self.url_pointer_at(self.header.main_page)?;
        self.read_entry(offset, REDIRECT_LIMIT)
    }

    /// The layout page recorded in the header.
    pub fn layout_page(&mut self) -> Result<DirectoryEntry> {
        if self.header.layout_page == NO_LAYOUT_PAGE {
            return Err(Error::NoLayoutPage);
        }
        let offset = self.url_pointer_at(self.header.layout_page)?;
        self.read_entry(offset, REDIRECT_LIMIT)
    }

    /// The archive favicon, probed at the conventional locations in the
    /// layout and image namespaces.
    pub fn favicon(&mut self) -> Result<DirectoryEntry> {
        for namespace in [Namespace::LAYOUT, Namespace::IMAGES_FILES] {
            for url in [&b"favicon"[..], &b"favicon.png"[..]] {
                let (entry, _, found) = self.entry_with_url(namespace, url)?;
                if found {
                    if entry.is_redirect() {
                        return self.follow_redirect(&entry);
                    }
                    return Ok(entry);
                }
            }
        }
        Err(Error::FaviconNotFound)
    }
}
