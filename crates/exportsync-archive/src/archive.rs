use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::format::{ArchiveFormat, detect_format};
use crate::sanitize::sanitize_entry_name;

/// Limits applied while decoding.
///
/// # Examples
///
/// ```
/// use exportsync_archive::DecodeOptions;
///
/// let options = DecodeOptions::default().max_entries(128).max_total_bytes(1 << 20);
/// assert_eq!(options.max_entries, 128);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum number of entries, directories included.
    ///
    /// Default: 4096
    pub max_entries: usize,

    /// Maximum sum of uncompressed entry sizes.
    ///
    /// Default: 256 MiB
    pub max_total_bytes: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_entries:     4096,
            max_total_bytes: 256 * 1024 * 1024,
        }
    }
}

impl DecodeOptions {
    #[must_use]
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    #[must_use]
    pub fn max_total_bytes(mut self, max_total_bytes: u64) -> Self {
        self.max_total_bytes = max_total_bytes;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A single decoded entry. File contents are held in memory.
#[derive(Clone, Debug)]
pub struct ArchiveEntry {
    path: String,
    kind: EntryKind,
    data: Bytes,
}

impl ArchiveEntry {
    pub fn path(&self) -> &str { &self.path }

    pub fn kind(&self) -> EntryKind { self.kind }

    pub fn is_file(&self) -> bool { self.kind == EntryKind::File }

    pub fn is_directory(&self) -> bool { self.kind == EntryKind::Directory }

    pub fn size(&self) -> u64 { self.data.len() as u64 }

    pub fn data(&self) -> &Bytes { &self.data }
}

/// A fully decoded export archive.
///
/// Entries are keyed by their sanitized `/`-separated path and iterate in
/// lexicographic order. The archive is immutable once decoded, so it can be
/// shared behind an `Arc` between any number of readers.
#[derive(Clone, Debug, Default)]
pub struct ExportArchive {
    entries:     BTreeMap<String, ArchiveEntry>,
    total_bytes: u64,
}

impl ExportArchive {
    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Sum of the uncompressed sizes of all file entries.
    pub fn total_bytes(&self) -> u64 { self.total_bytes }

    pub fn names(&self) -> impl Iterator<Item = &str> { self.entries.keys().map(String::as_str) }

    pub fn entries(&self) -> impl Iterator<Item = &ArchiveEntry> { self.entries.values() }

    pub fn contains(&self, path: &str) -> bool { self.entries.contains_key(path) }

    pub fn entry(&self, path: &str) -> Option<&ArchiveEntry> { self.entries.get(path) }

    /// File entries whose path starts with `prefix`.
    pub fn files_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a ArchiveEntry> {
        self.entries
            .range(prefix.to_string()..)
            .take_while(move |(name, _)| name.starts_with(prefix))
            .map(|(_, entry)| entry)
            .filter(|entry| entry.is_file())
    }

    pub fn read_bytes(&self, path: &str) -> Result<&Bytes> {
        self.entries
            .get(path)
            .filter(|entry| entry.is_file())
            .map(ArchiveEntry::data)
            .ok_or_else(|| Error::EntryNotFound(path.to_string()))
    }

    pub fn read_to_string(&self, path: &str) -> Result<&str> {
        let data = self.read_bytes(path)?;
        std::str::from_utf8(data).map_err(|_| Error::NotUtf8 {
            path: path.to_string(),
        })
    }

    /// Parse a JSON document stored in the archive.
    pub fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let data = self.read_bytes(path)?;
        serde_json::from_slice(data).map_err(|source| Error::Json {
            path: path.to_string(),
            source,
        })
    }
}

/// Decode a zip payload held in memory.
pub fn decode(data: &[u8], options: &DecodeOptions) -> Result<ExportArchive> {
    if data.is_empty() {
        return Err(Error::Empty);
    }
    match detect_format(data) {
        Some(ArchiveFormat::Zip) => {}
        _ => return Err(Error::UnsupportedFormat),
    }

    let mut zip = zip::ZipArchive::new(Cursor::new(data))?;
    if zip.len() > options.max_entries {
        return Err(Error::TooManyEntries {
            limit: options.max_entries,
        });
    }

    let mut archive = ExportArchive::default();
    for index in 0..zip.len() {
        let mut file = zip.by_index(index)?;
        let path = sanitize_entry_name(file.name())?;
        if archive.entries.contains_key(&path) {
            return Err(Error::DuplicateEntry(path));
        }

        if file.is_dir() {
            if !path.is_empty() {
                archive.entries.insert(path.clone(), ArchiveEntry {
                    path,
                    kind: EntryKind::Directory,
                    data: Bytes::new(),
                });
            }
            continue;
        }
        if path.is_empty() {
            return Err(Error::InvalidPath(file.name().to_string()));
        }

        let remaining = options.max_total_bytes.saturating_sub(archive.total_bytes);
        if file.size() > remaining {
            return Err(Error::TooLarge {
                limit: options.max_total_bytes,
            });
        }

        // the declared size is not trusted; cap the actual read as well
        let mut content = Vec::with_capacity(file.size() as usize);
        (&mut file).take(remaining + 1).read_to_end(&mut content)?;
        if content.len() as u64 > remaining {
            return Err(Error::TooLarge {
                limit: options.max_total_bytes,
            });
        }

        archive.total_bytes += content.len() as u64;
        archive.entries.insert(path.clone(), ArchiveEntry {
            path,
            kind: EntryKind::File,
            data: Bytes::from(content),
        });
    }

    Ok(archive)
}
