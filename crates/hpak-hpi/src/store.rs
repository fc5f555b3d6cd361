//! The decoded archive: normalized virtual path to file bytes.

use std::collections::btree_map::{self, BTreeMap};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::{HpiReader, Result};

/// Every file of an archive, fully decoded.
///
/// Keys are normalized: `/`-separated, rooted at `/`, lowercase. Lookups
/// normalize their argument the same way, so they are case-insensitive and
/// accept `\` separators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveStore {
    files: BTreeMap<String, Vec<u8>>,
}

impl ArchiveStore {
    /// Open and fully decode the archive at `path`.
    ///
    /// The file is memory-mapped for the duration of the decode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        HpiReader::open(path)?.into_store()
    }

    /// Decode an archive from a seekable source.
    pub fn from_reader<R: Read + Seek>(source: R) -> Result<Self> {
        HpiReader::new(source)?.into_store()
    }

    /// Decode an archive held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Insert decoded bytes under the normalized form of `path`.
    ///
    /// Returns the previous bytes if another entry normalized to the same key.
    pub(crate) fn insert(&mut self, path: &str, data: Vec<u8>) -> Option<Vec<u8>> {
        self.files.insert(normalize_path(path), data)
    }

    /// Get the bytes of a file.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(&normalize_path(path)).map(Vec::as_slice)
    }

    /// Check if a file exists.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    /// Get the number of files.
    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the archive held no files.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all file sizes.
    pub fn total_size(&self) -> u64 {
        self.files.values().map(|data| data.len() as u64).sum()
    }

    /// Iterate over normalized paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.keys().map(String::as_str)
    }

    /// Iterate over `(path, bytes)` in sorted path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> + '_ {
        self.files
            .iter()
            .map(|(path, data)| (path.as_str(), data.as_slice()))
    }

    /// Files anywhere below directory `dir`, optionally restricted to an
    /// extension (without the dot, case-insensitive).
    pub fn files_in<'a>(
        &'a self,
        dir: &str,
        extension: Option<&'a str>,
    ) -> impl Iterator<Item = (&'a str, &'a [u8])> + 'a {
        let mut prefix = normalize_path(dir);
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        let suffix = extension.map(|ext| format!(".{}", ext.to_lowercase()));

        self.files
            .range(prefix.clone()..)
            .take_while(move |(path, _)| path.starts_with(&prefix))
            .filter(move |(path, _)| suffix.as_ref().map_or(true, |s| path.ends_with(s.as_str())))
            .map(|(path, data)| (path.as_str(), data.as_slice()))
    }

    /// Consume the store, returning the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, Vec<u8>> {
        self.files
    }
}

impl IntoIterator for ArchiveStore {
    type Item = (String, Vec<u8>);
    type IntoIter = btree_map::IntoIter<String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Join `name` onto `parent`, keeping case.
///
/// Both sides may use `/` or `\`. Empty and `.` segments are dropped and
/// `..` removes the previous segment without ever leaving the root.
///
/// A `\` inside an on-disk name is a separator too, so an entry literally
/// named `a\b.txt` lands at `/a/b.txt`. Such names cannot be extracted as a
/// single file on Windows, and keys never carry a `\` that lookups would
/// have to treat differently.
pub fn join_path(parent: &str, name: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in parent.split(['/', '\\']).chain(name.split(['/', '\\'])) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut out = String::with_capacity(parent.len() + name.len() + 1);
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Normalize a virtual path into store key form.
pub fn normalize_path(path: &str) -> String {
    join_path("/", path).to_lowercase()
}
