//! Directory tree traversal.
//!
//! Directories are reached only through offsets stored in their parent, so
//! the walk is a depth-first recursion over the on-disk index. Every
//! directory index is walked at most once; an offset reached a second time
//! is malformed, whether it loops back up the tree or is shared between
//! two parents.

use std::collections::HashSet;
use std::io::{Read, Seek};

use hpak_common::SeekReadExt;
use tracing::trace;

use crate::format::{DirectoryEntry, DirectoryIndex};
use crate::store::join_path;
use crate::{Error, ReadOptions, Result};

/// Longest accepted entry name.
pub(crate) const MAX_NAME_LEN: usize = 4096;

/// Receives every file found by the walk.
pub(crate) trait EntrySink<R> {
    /// Handle the file at `path` whose placement record is at `record_offset`.
    ///
    /// The sink may move the source's position freely.
    fn file(&mut self, source: &mut R, path: String, record_offset: u64) -> Result<()>;
}

/// Depth-first walker over directory indexes.
pub(crate) struct Walker<'o> {
    options: &'o ReadOptions,
    /// Offsets of the directories on the current descent path.
    ancestors: Vec<u32>,
    /// Offsets of every directory walked so far.
    visited: HashSet<u32>,
}

impl<'o> Walker<'o> {
    pub(crate) fn new(options: &'o ReadOptions) -> Self {
        Self {
            options,
            ancestors: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Walk the directory whose index is at `offset`, naming children
    /// relative to `parent`.
    pub(crate) fn walk<R, S>(
        &mut self,
        source: &mut R,
        parent: &str,
        offset: u32,
        sink: &mut S,
    ) -> Result<()>
    where
        R: Read + Seek,
        S: EntrySink<R>,
    {
        if self.ancestors.contains(&offset) {
            return Err(Error::DirectoryCycle(offset));
        }
        if !self.visited.insert(offset) {
            return Err(Error::SharedDirectory(offset));
        }
        if self.ancestors.len() >= self.options.max_depth {
            return Err(Error::DirectoryTooDeep(self.options.max_depth));
        }

        let index: DirectoryIndex = source.read_struct_at(offset as u64)?;
        trace!(
            path = parent,
            offset,
            entries = index.entry_count.get(),
            "directory"
        );

        self.ancestors.push(offset);
        for i in 0..index.entry_count.get() {
            let entry: DirectoryEntry = source.read_struct_at(index.entry_position(i))?;
            let name = source.read_cstring_at(entry.name_offset.get() as u64, MAX_NAME_LEN)?;
            let path = join_path(parent, &String::from_utf8_lossy(&name));

            if entry.is_directory() {
                self.walk(source, &path, entry.data_offset.get(), sink)?;
            } else {
                sink.file(source, path, entry.data_offset.get() as u64)?;
            }
        }
        self.ancestors.pop();

        Ok(())
    }
}
