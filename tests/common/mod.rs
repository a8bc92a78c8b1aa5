//! Shared fixture: builds a small but complete ZIM archive on disk.
//!
//! The image contains mixed namespaces, a redirect, an entry with an
//! empty title, a stored cluster, an xz cluster, a stored cluster with
//! 8-byte offsets, metadata entries that must be skipped (oversized key
//! and value), and a correct trailing MD5.

#![allow(dead_code)]

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use md5::{Digest, Md5};
use tempfile::NamedTempFile;
use xz2::write::XzEncoder;

pub const ARTICLE_COUNT: u32 = 14;
pub const CLUSTER_COUNT: u32 = 3;
pub const UUID_HEX: &str = "000102030405060708090a0b0c0d0e0f";

pub const FAVICON_DATA: &[u8] = b"\x89PNG\r\n\x1a\nfake-favicon-pixels";
pub const LOGO_DATA: &[u8] = b"\x89PNG\r\n\x1a\nfake-logo-pixels";
pub const INDEX_HTML: &[u8] =
    b"<html><head><title>Main Page</title></head><body><h1>Welcome</h1></body></html>";
pub const MARS_HTML: &[u8] = b"<html><body><p>Mars is the fourth planet.</p></body></html>";
pub const MOON_HTML: &[u8] = b"<html><body><p>The Moon orbits Earth.</p></body></html>";
pub const XAPIAN_DATA: &[u8] = b"opaque index data";

/// Size of the metadata value that must be skipped for exceeding the
/// 2048-byte bound.
pub const OVERSIZED_VALUE_LEN: usize = 3000;

pub struct Fixture {
    pub file: NamedTempFile,
    pub checksum_pos: u64,
    /// Absolute offset of each cluster's information byte.
    pub cluster_info_offsets: Vec<u64>,
}

impl Fixture {
    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

enum Kind {
    Article { mimetype: u16, cluster: u32, blob: u32 },
    Redirect { target_url: &'static [u8] },
    LinkTarget,
    Deleted,
}

struct Entry {
    namespace: u8,
    url: Vec<u8>,
    title: Vec<u8>,
    kind: Kind,
}

fn entry(namespace: u8, url: &[u8], title: &[u8], kind: Kind) -> Entry {
    Entry {
        namespace,
        url: url.to_vec(),
        title: title.to_vec(),
        kind,
    }
}

/// The directory, already sorted by (namespace, url).
fn directory() -> Vec<Entry> {
    let mut long_key = b"Z".to_vec();
    long_key.extend(std::iter::repeat(b'z').take(199));
    vec![
        entry(
            b'-',
            b"favicon",
            b"Favicon",
            Kind::Article { mimetype: 0, cluster: 0, blob: 0 },
        ),
        entry(
            b'A',
            b"index.html",
            b"Main Page",
            Kind::Article { mimetype: 1, cluster: 1, blob: 0 },
        ),
        entry(
            b'A',
            b"luna.html",
            b"Luna",
            Kind::Redirect { target_url: b"moon.html" },
        ),
        entry(
            b'A',
            b"mars.html",
            b"Mars",
            Kind::Article { mimetype: 1, cluster: 1, blob: 1 },
        ),
        entry(
            b'A',
            b"moon.html",
            b"Moon",
            Kind::Article { mimetype: 1, cluster: 1, blob: 2 },
        ),
        entry(b'A', b"yeti.html", b"Yeti", Kind::Deleted),
        entry(b'A', b"zebra", b"Zebra", Kind::LinkTarget),
        entry(
            b'I',
            b"logo.png",
            b"",
            Kind::Article { mimetype: 0, cluster: 0, blob: 1 },
        ),
        entry(
            b'M',
            b"Counter",
            b"",
            Kind::Article { mimetype: 2, cluster: 0, blob: 2 },
        ),
        entry(
            b'M',
            b"Language",
            b"",
            Kind::Article { mimetype: 2, cluster: 0, blob: 3 },
        ),
        entry(
            b'M',
            b"Title",
            b"",
            Kind::Article { mimetype: 2, cluster: 0, blob: 4 },
        ),
        entry(
            b'M',
            b"X-Large",
            b"",
            Kind::Article { mimetype: 2, cluster: 2, blob: 0 },
        ),
        Entry {
            namespace: b'M',
            url: long_key,
            title: Vec::new(),
            kind: Kind::Article { mimetype: 2, cluster: 0, blob: 5 },
        },
        entry(
            b'X',
            b"fulltext/xapian",
            b"",
            Kind::Article { mimetype: 2, cluster: 2, blob: 1 },
        ),
    ]
}

/// Offset table followed by the concatenated blobs, offsets relative to
/// the payload start.
fn payload(blobs: &[&[u8]], wide: bool) -> Vec<u8> {
    let offset_size = if wide { 8u64 } else { 4 };
    let table_len = offset_size * (blobs.len() as u64 + 1);
    let mut offsets = vec![table_len];
    let mut end = table_len;
    for blob in blobs {
        end += blob.len() as u64;
        offsets.push(end);
    }
    let mut out = Vec::new();
    for offset in offsets {
        if wide {
            out.write_u64::<LittleEndian>(offset).unwrap();
        } else {
            out.write_u32::<LittleEndian>(offset as u32).unwrap();
        }
    }
    for blob in blobs {
        out.extend_from_slice(blob);
    }
    out
}

fn stored_cluster(information: u8, blobs: &[&[u8]]) -> Vec<u8> {
    let wide = information & 16 != 0;
    let mut out = vec![information];
    out.extend_from_slice(&payload(blobs, wide));
    out
}

fn xz_cluster(blobs: &[&[u8]]) -> Vec<u8> {
    let raw = payload(blobs, false);
    let mut encoder = XzEncoder::new(Vec::new(), 6);
    encoder.write_all(&raw).unwrap();
    let compressed = encoder.finish().unwrap();
    let mut out = vec![0x04];
    out.extend_from_slice(&compressed);
    out
}

fn encode_entry(buf: &mut Vec<u8>, e: &Entry, all: &[Entry]) {
    let mimetype = match &e.kind {
        Kind::Article { mimetype, .. } => *mimetype,
        Kind::Redirect { .. } => 0xFFFF,
        Kind::LinkTarget => 0xFFFE,
        Kind::Deleted => 0xFFFD,
    };
    buf.write_u16::<LittleEndian>(mimetype).unwrap();
    buf.push(0); // parameter length
    buf.push(e.namespace);
    buf.write_u32::<LittleEndian>(0).unwrap(); // revision
    match &e.kind {
        Kind::Article { cluster, blob, .. } => {
            buf.write_u32::<LittleEndian>(*cluster).unwrap();
            buf.write_u32::<LittleEndian>(*blob).unwrap();
        }
        Kind::Redirect { target_url } => {
            let target = all
                .iter()
                .position(|t| t.namespace == e.namespace && t.url == *target_url)
                .unwrap() as u32;
            buf.write_u32::<LittleEndian>(target).unwrap();
        }
        Kind::LinkTarget | Kind::Deleted => {}
    }
    buf.extend_from_slice(&e.url);
    buf.push(0);
    buf.extend_from_slice(&e.title);
    buf.push(0);
}

pub fn build_fixture() -> Fixture {
    let entries = directory();

    // mimetype list; the first entry checks trimming and lowercasing
    let mimetypes: &[&[u8]] = &[b" Image/PNG ", b"text/html", b"text/plain"];
    let mut mimelist = Vec::new();
    for m in mimetypes {
        mimelist.extend_from_slice(m);
        mimelist.push(0);
    }
    mimelist.push(0);

    let oversized = vec![b'x'; OVERSIZED_VALUE_LEN];
    let clusters = [
        stored_cluster(
            0x01,
            &[
                FAVICON_DATA,
                LOGO_DATA,
                b"text/html=3",
                b"eng",
                b"Test Archive",
                b"skipme",
            ],
        ),
        xz_cluster(&[INDEX_HTML, MARS_HTML, MOON_HTML]),
        stored_cluster(0x11, &[&oversized, XAPIAN_DATA]),
    ];

    let n = entries.len() as u64;
    let mime_list_pos = 80u64;
    let url_ptr_pos = mime_list_pos + mimelist.len() as u64;
    let title_ptr_pos = url_ptr_pos + 8 * n;
    let cluster_ptr_pos = title_ptr_pos + 4 * n;
    let entries_base = cluster_ptr_pos + 8 * clusters.len() as u64;

    let mut entry_blob = Vec::new();
    let mut entry_offsets = Vec::new();
    for e in &entries {
        entry_offsets.push(entries_base + entry_blob.len() as u64);
        encode_entry(&mut entry_blob, e, &entries);
    }

    let clusters_base = entries_base + entry_blob.len() as u64;
    let mut cluster_ptrs = Vec::new();
    let mut pos = clusters_base;
    for c in &clusters {
        cluster_ptrs.push(pos);
        pos += c.len() as u64;
    }
    let checksum_pos = pos;

    // title pointer list: URL-list indices sorted by (namespace, title);
    // the sort is stable, so equal titles keep URL order
    let mut title_order: Vec<u32> = (0..entries.len() as u32).collect();
    title_order.sort_by(|&a, &b| {
        let ea = &entries[a as usize];
        let eb = &entries[b as usize];
        (ea.namespace, &ea.title).cmp(&(eb.namespace, &eb.title))
    });

    let main_page = entries
        .iter()
        .position(|e| e.namespace == b'A' && e.url == b"index.html")
        .unwrap() as u32;

    let mut image = Vec::new();
    image.write_u32::<LittleEndian>(72_173_914).unwrap();
    image.write_u16::<LittleEndian>(5).unwrap();
    image.write_u16::<LittleEndian>(0).unwrap();
    let uuid: Vec<u8> = (0u8..16).collect();
    image.extend_from_slice(&uuid);
    image.write_u32::<LittleEndian>(entries.len() as u32).unwrap();
    image.write_u32::<LittleEndian>(clusters.len() as u32).unwrap();
    image.write_u64::<LittleEndian>(url_ptr_pos).unwrap();
    image.write_u64::<LittleEndian>(title_ptr_pos).unwrap();
    image.write_u64::<LittleEndian>(cluster_ptr_pos).unwrap();
    image.write_u64::<LittleEndian>(mime_list_pos).unwrap();
    image.write_u32::<LittleEndian>(main_page).unwrap();
    image.write_u32::<LittleEndian>(0xFFFF_FFFF).unwrap(); // no layout page
    image.write_u64::<LittleEndian>(checksum_pos).unwrap();
    assert_eq!(image.len(), 80);

    image.extend_from_slice(&mimelist);
    for offset in &entry_offsets {
        image.write_u64::<LittleEndian>(*offset).unwrap();
    }
    for index in &title_order {
        image.write_u32::<LittleEndian>(*index).unwrap();
    }
    for ptr in &cluster_ptrs {
        image.write_u64::<LittleEndian>(*ptr).unwrap();
    }
    image.extend_from_slice(&entry_blob);
    for c in &clusters {
        image.extend_from_slice(c);
    }
    assert_eq!(image.len() as u64, checksum_pos);

    let digest: [u8; 16] = Md5::digest(&image).into();
    image.extend_from_slice(&digest);

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&image).unwrap();
    file.flush().unwrap();
    Fixture {
        file,
        checksum_pos,
        cluster_info_offsets: cluster_ptrs,
    }
}

/// Writes a copy of the fixture with the byte at `offset` replaced.
pub fn build_patched_fixture(patch_offset: u64, value: u8) -> Fixture {
    let fixture = build_fixture();
    let mut image = std::fs::read(fixture.path()).unwrap();
    image[patch_offset as usize] = value;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&image).unwrap();
    file.flush().unwrap();
    Fixture {
        file,
        checksum_pos: fixture.checksum_pos,
        cluster_info_offsets: fixture.cluster_info_offsets,
    }
}
