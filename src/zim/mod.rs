//! Reader for the ZIM container format.
//!
//! The format keeps three sorted pointer lists (URL order, title order,
//! and cluster offsets), a directory of entries addressed through them,
//! and the entry payloads packed into optionally xz-compressed clusters.
//! [`ZimFile`] ties the pieces together; [`DirectoryEntry`] and
//! [`Cluster`] are self-contained values that may outlive any number of
//! other calls.

mod checksum;
mod cluster;
mod directory;
mod error;
mod file;
mod metadata;
mod search;
mod structures;

pub use cluster::{BlobReader, Cluster};
pub use error::{Error, Result};
pub use file::ZimFile;
pub use structures::{
    DirectoryEntry, EntryKind, Header, Namespace, Uuid, MAGIC_NUMBER, MIMETYPE_DELETED_ENTRY,
    MIMETYPE_LINK_TARGET, MIMETYPE_REDIRECT_ENTRY, NO_LAYOUT_PAGE, NO_MAIN_PAGE,
};
