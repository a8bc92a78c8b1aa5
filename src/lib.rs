//! # ruzim
//!
//! A Rust reader for the ZIM file format.
//!
//! ZIM is a compressed, self-contained container format used to distribute
//! offline snapshots of wiki-style corpora. This library provides read-only
//! access to such archives: enumeration and lookup of directory entries by
//! namespace, URL, or title; streamed retrieval of entry payloads from
//! optionally xz-compressed clusters; the mimetype and metadata
//! dictionaries; and integrity verification against the embedded MD5.
//!
//! ## Features
//!
//! - Exact, prefix, and similarity lookup over the URL- and title-ordered
//!   pointer lists
//! - Streaming blob access with constant-cost seeks into stored clusters
//! - Whole-cluster materialization for bulk iteration
//! - Redirect resolution with a bounded follow depth
//! - MD5 checksum validation of the archive
//!
//! ## Example
//!
//! ```no_run
//! use std::io::Read;
//! use ruzim::{Namespace, ZimFile};
//!
//! fn main() -> ruzim::Result<()> {
//!     let mut zim = ZimFile::open("wikipedia.zim")?;
//!
//!     // Look up an article by URL and print its content.
//!     let (mut entry, _, found) = zim.entry_with_url(Namespace::ARTICLES, b"index.html")?;
//!     if found {
//!         if entry.is_redirect() {
//!             entry = zim.follow_redirect(&entry)?;
//!         }
//!         let mut html = String::new();
//!         zim.blob_reader(&entry)?.read_to_string(&mut html)?;
//!         println!("{html}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
mod io;
pub mod zim;

pub use cli::Cli;
pub use zim::{
    BlobReader, Cluster, DirectoryEntry, EntryKind, Error, Header, Namespace, Result, Uuid,
    ZimFile,
};
