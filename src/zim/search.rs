//! Binary search over the URL- and title-ordered pointer lists: exact,
//! prefix, and similarity lookup.
//!
//! Searches return `(entry, position, found)`. On a miss the entry and
//! position are those of the last probed slot; this is a diagnostic, not
//! an insertion point.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::error::Result;
use super::file::ZimFile;
use super::structures::{DirectoryEntry, Namespace};

/// Number of entries a bulk listing returns when the caller passes 0.
const DEFAULT_LIMIT_ENTRIES: usize = 100;

/// Which field of an entry a search compares against, and through which
/// pointer list the entry is reached.
#[derive(Clone, Copy)]
enum SearchField {
    Url,
    Title,
}

impl SearchField {
    fn pointer_at(self, zim: &mut ZimFile, position: u32) -> Result<u64> {
        match self {
            SearchField::Url => zim.url_pointer_at(position),
            SearchField::Title => zim.title_pointer_at(position),
        }
    }

    /// The raw stored field, without the title-to-URL fallback.
    fn choose(self, entry: &DirectoryEntry) -> &[u8] {
        match self {
            SearchField::Url => &entry.url,
            SearchField::Title => &entry.title,
        }
    }
}

/// Compares `s` against `prefix`, treating any string that starts with
/// the prefix as equal.
fn cmp_prefix(s: &[u8], prefix: &[u8]) -> Ordering {
    if s.starts_with(prefix) {
        Ordering::Equal
    } else {
        s.cmp(prefix)
    }
}

/// 32-bit FNV-1a, the dedup key for similarity suggestions.
fn fnv1a(data: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for &b in data {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

impl ZimFile {
    /// Searches the URL pointer list for the exact `(namespace, url)`
    /// pair. On a hit the returned position indexes the URL pointer list
    /// and can seed iteration via [`ZimFile::entry_at_url_position`].
    pub fn entry_with_url(
        &mut self,
        namespace: Namespace,
        url: &[u8],
    ) -> Result<(DirectoryEntry, u32, bool)> {
        let mut probed: Option<DirectoryEntry> = None;
        let mut current: i64 = 0;
        let mut first: i64 = 0;
        let mut last = i64::from(self.header.article_count) - 1;
        let mut found = false;
        while first <= last {
            current = (first + last) >> 1;
            let offset = self.url_pointer_at(current as u32)?;
            let entry = self.read_entry(offset, 0)?;
            let mut c = entry.namespace.cmp(&namespace);
            if c == Ordering::Equal {
                c = entry.url.as_slice().cmp(url);
            }
            let is_match = c == Ordering::Equal;
            probed = Some(entry);
            if is_match {
                found = true;
                break;
            }
            if c == Ordering::Less {
                first = current + 1;
            } else {
                last = current - 1;
            }
        }
        Ok((
            probed.unwrap_or_else(DirectoryEntry::empty),
            current as u32,
            found,
        ))
    }

    /// The first entry in `namespace` whose URL starts with `prefix`.
    pub fn entry_with_url_prefix(
        &mut self,
        namespace: Namespace,
        prefix: &[u8],
    ) -> Result<(DirectoryEntry, u32, bool)> {
        self.entry_with_prefix(SearchField::Url, namespace, prefix)
    }

    /// The first entry in `namespace`. Positions index the URL pointer
    /// list.
    pub fn entry_with_namespace(
        &mut self,
        namespace: Namespace,
    ) -> Result<(DirectoryEntry, u32, bool)> {
        self.entry_with_url_prefix(namespace, b"")
    }

    /// The first entry in `namespace` whose stored title starts with
    /// `prefix`. Positions index the title pointer list.
    pub fn entry_with_title_prefix(
        &mut self,
        namespace: Namespace,
        prefix: &[u8],
    ) -> Result<(DirectoryEntry, u32, bool)> {
        self.entry_with_prefix(SearchField::Title, namespace, prefix)
    }

    /// Up to `limit` entries in `namespace` whose URL starts with
    /// `prefix`, in URL order. A limit of 0 selects the default of 100.
    pub fn entries_with_url_prefix(
        &mut self,
        namespace: Namespace,
        prefix: &[u8],
        limit: usize,
    ) -> Result<Vec<DirectoryEntry>> {
        self.entries_with_prefix(SearchField::Url, namespace, prefix, limit)
    }

    /// The first `limit` entries in `namespace`, in URL order. A limit of
    /// 0 selects the default of 100.
    pub fn entries_with_namespace(
        &mut self,
        namespace: Namespace,
        limit: usize,
    ) -> Result<Vec<DirectoryEntry>> {
        self.entries_with_url_prefix(namespace, b"", limit)
    }

    /// Up to `limit` entries in `namespace` whose stored title starts
    /// with `prefix`, in title order. A limit of 0 selects the default of
    /// 100.
    pub fn entries_with_title_prefix(
        &mut self,
        namespace: Namespace,
        prefix: &[u8],
        limit: usize,
    ) -> Result<Vec<DirectoryEntry>> {
        self.entries_with_prefix(SearchField::Title, namespace, prefix, limit)
    }

    /// Entries whose URL or title is similar to `prefix`: both prefix
    /// listings are interleaved and the prefix is shortened one byte at a
    /// time (which may split a UTF-8 code point) until the limit is
    /// filled. Results are deduplicated by a hash of the URL. A limit of
    /// 0 selects the default of 100.
    pub fn entries_with_similarity(
        &mut self,
        namespace: Namespace,
        prefix: &[u8],
        limit: usize,
    ) -> Result<Vec<DirectoryEntry>> {
        const MAX_LENGTH_DIFFERENCE: usize = 15;
        let limit = if limit == 0 { DEFAULT_LIMIT_ENTRIES } else { limit };
        let mut prefix = prefix.to_vec();
        let mut already_suggested = HashSet::with_capacity(limit);
        let mut suggestions = Vec::with_capacity(limit.min(DEFAULT_LIMIT_ENTRIES));
        for _ in 0..MAX_LENGTH_DIFFERENCE {
            for field in [SearchField::Url, SearchField::Title] {
                let next = self.entries_with_prefix(field, namespace, &prefix, limit)?;
                for suggestion in next {
                    if already_suggested.insert(fnv1a(&suggestion.url)) {
                        suggestions.push(suggestion);
                        if suggestions.len() >= limit {
                            return Ok(suggestions);
                        }
                    }
                }
            }
            if prefix.is_empty() {
                return Ok(suggestions);
            }
            prefix.pop();
        }
        Ok(suggestions)
    }

    /// Locates the lowest-positioned entry of `namespace` whose chosen
    /// field starts with `prefix`. When a probe matches, the entry just
    /// before it decides whether the probe is the left edge of the
    /// matching run or the search must continue leftward.
    fn entry_with_prefix(
        &mut self,
        field: SearchField,
        namespace: Namespace,
        prefix: &[u8],
    ) -> Result<(DirectoryEntry, u32, bool)> {
        let mut probed: Option<DirectoryEntry> = None;
        let mut current: i64 = 0;
        let mut first: i64 = 0;
        let mut last = i64::from(self.header.article_count) - 1;
        let mut found = false;
        while first <= last {
            current = (first + last) >> 1;
            let offset = field.pointer_at(self, current as u32)?;
            let entry = self.read_entry(offset, 0)?;
            let mut c = entry.namespace.cmp(&namespace);
            if c == Ordering::Equal {
                c = cmp_prefix(field.choose(&entry), prefix);
                if c == Ordering::Equal {
                    let mut lowest = current == 0;
                    if !lowest {
                        let prev_offset = field.pointer_at(self, (current - 1) as u32)?;
                        let prev = self.read_entry(prev_offset, 0)?;
                        lowest = prev.namespace != namespace
                            || !field.choose(&prev).starts_with(prefix);
                    }
                    if lowest {
                        probed = Some(entry);
                        found = true;
                        break;
                    }
                    // earlier entries share the prefix, keep looking left
                    c = Ordering::Greater;
                }
            }
            probed = Some(entry);
            if c == Ordering::Less {
                first = current + 1;
            } else {
                last = current - 1;
            }
        }
        Ok((
            probed.unwrap_or_else(DirectoryEntry::empty),
            current as u32,
            found,
        ))
    }

    /// Finds the first match and walks the pointer list forward until the
    /// limit fills, the namespace or prefix stops matching, or the list
    /// ends.
    fn entries_with_prefix(
        &mut self,
        field: SearchField,
        namespace: Namespace,
        prefix: &[u8],
        limit: usize,
    ) -> Result<Vec<DirectoryEntry>> {
        let limit = if limit == 0 { DEFAULT_LIMIT_ENTRIES } else { limit };
        let (entry, mut position, found) = self.entry_with_prefix(field, namespace, prefix)?;
        if !found {
            return Ok(Vec::new());
        }
        let mut result = Vec::with_capacity(limit.min(DEFAULT_LIMIT_ENTRIES));
        result.push(entry);
        let last_position = self.header.article_count - 1;
        while result.len() < limit && position < last_position {
            position += 1;
            let offset = field.pointer_at(self, position)?;
            let next = self.read_entry(offset, 0)?;
            if next.namespace != namespace || !field.choose(&next).starts_with(prefix) {
                break;
            }
            result.push(next);
        }
        Ok(result)
    }
}
