//! The metadata map populated from namespace `M` entries.

use std::collections::HashMap;
use std::io::Read;

use super::file::ZimFile;
use super::structures::Namespace;

const ENTRY_LIMIT: usize = 256;
const MAX_KEY_SIZE: usize = 128;
const MAX_VALUE_SIZE: u64 = 2048;

impl ZimFile {
    /// Populates the metadata map from the `M` namespace, bounded in
    /// entry count, key length, and value size. Entries that fail to read
    /// or exceed the bounds are skipped silently.
    pub(crate) fn read_metadata(&mut self) {
        let entries = match self.entries_with_namespace(Namespace::ZIM_METADATA, ENTRY_LIMIT) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for entry in entries {
            if entry.url().len() > MAX_KEY_SIZE {
                continue;
            }
            // the reader borrows the file cursor; it is scoped so the map
            // can be touched afterwards
            let mut value = Vec::new();
            {
                let Ok(mut blob_reader) = self.blob_reader(&entry) else {
                    continue;
                };
                if blob_reader.size() > MAX_VALUE_SIZE {
                    continue;
                }
                value.reserve_exact(blob_reader.size() as usize);
                if blob_reader.read_to_end(&mut value).is_err() {
                    continue;
                }
            }
            let key = String::from_utf8_lossy(entry.url()).into_owned();
            self.metadata
                .insert(key, String::from_utf8_lossy(&value).into_owned());
        }
    }

    /// A copy of the metadata map.
    pub fn metadata(&self) -> HashMap<String, String> {
        self.metadata.clone()
    }

    /// The metadata value stored under `key`, if any.
    pub fn metadata_for(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Name of the archive, as found in the metadata.
    pub fn name(&self) -> Option<&str> {
        self.metadata_for("Name")
    }

    /// Title of the archive.
    pub fn title(&self) -> Option<&str> {
        self.metadata_for("Title")
    }

    /// Creator of the archived content.
    pub fn creator(&self) -> Option<&str> {
        self.metadata_for("Creator")
    }

    /// Publisher of the archive.
    pub fn publisher(&self) -> Option<&str> {
        self.metadata_for("Publisher")
    }

    /// Creation date of the archive.
    pub fn date(&self) -> Option<&str> {
        self.metadata_for("Date")
    }

    /// Short description of the archive.
    pub fn description(&self) -> Option<&str> {
        self.metadata_for("Description")
    }

    /// Long description of the archive.
    pub fn long_description(&self) -> Option<&str> {
        self.metadata_for("LongDescription")
    }

    /// Content language of the archive.
    pub fn language(&self) -> Option<&str> {
        self.metadata_for("Language")
    }

    /// License of the archived content.
    pub fn license(&self) -> Option<&str> {
        self.metadata_for("License")
    }

    /// Tags attached to the archive.
    pub fn tags(&self) -> Option<&str> {
        self.metadata_for("Tags")
    }

    /// Relation to other archives.
    pub fn relation(&self) -> Option<&str> {
        self.metadata_for("Relation")
    }

    /// Source the archive was built from.
    pub fn source(&self) -> Option<&str> {
        self.metadata_for("Source")
    }

    /// Directory entry counts per mimetype, as recorded by the writer.
    pub fn counter(&self) -> Option<&str> {
        self.metadata_for("Counter")
    }
}
