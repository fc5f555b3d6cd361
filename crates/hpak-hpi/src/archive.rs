//! HPI archive reader.
//!
//! [`HpiReader`] validates the header on construction and then walks the
//! directory tree on demand, either decoding every file into an
//! [`ArchiveStore`] or only listing placement records.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, warn};
use zerocopy::FromBytes;

use crate::entry::{self, EntryInfo};
use crate::format::{HpiHeader, MAX_CHUNK_SIZE};
use crate::walker::{EntrySink, Walker};
use crate::{ArchiveStore, Error, Result};

/// Knobs for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Verify each chunk's payload checksum.
    pub verify_checksums: bool,
    /// Deepest directory nesting accepted.
    pub max_depth: usize,
    /// Bytes that may be skipped while looking for a chunk marker.
    pub max_marker_scan: u64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            verify_checksums: false,
            max_depth: 64,
            max_marker_scan: 16 * MAX_CHUNK_SIZE as u64,
        }
    }
}

/// Reader over one HPI archive.
///
/// The source is owned exclusively for the reader's lifetime.
pub struct HpiReader<R> {
    source: R,
    header: HpiHeader,
    options: ReadOptions,
}

impl HpiReader<Cursor<Mmap>> {
    /// Memory-map the archive at `path` and validate its header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ReadOptions::default())
    }

    /// Memory-map the archive at `path` with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::with_options(Cursor::new(mmap), options)
    }
}

impl<R: Read + Seek> HpiReader<R> {
    /// Validate the header of `source` with default options.
    pub fn new(source: R) -> Result<Self> {
        Self::with_options(source, ReadOptions::default())
    }

    /// Validate the header of `source`.
    ///
    /// Fails with [`Error::InvalidMagic`] before anything past the first four
    /// bytes is read.
    pub fn with_options(mut source: R, options: ReadOptions) -> Result<Self> {
        source.rewind()?;
        let header = read_header(&mut source)?;

        debug!(
            root = header.root_offset(),
            directory_size = header.directory_size.get(),
            save = header.is_save(),
            "opened archive"
        );

        Ok(Self {
            source,
            header,
            options,
        })
    }

    /// Get the parsed header.
    #[inline]
    pub fn header(&self) -> &HpiHeader {
        &self.header
    }

    /// Get the decode options.
    #[inline]
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// List every file without decoding its data.
    pub fn entries(&mut self) -> Result<Vec<EntryInfo>> {
        let mut sink = ListSink::default();
        let root = self.header.root_offset();
        Walker::new(&self.options).walk(&mut self.source, "/", root, &mut sink)?;
        Ok(sink.entries)
    }

    /// Decode every file into a store.
    ///
    /// Fails on the first structural error; no partial store is returned.
    pub fn read_store(&mut self) -> Result<ArchiveStore> {
        let mut sink = StoreSink {
            store: ArchiveStore::default(),
            options: &self.options,
        };
        let root = self.header.root_offset();
        Walker::new(&self.options).walk(&mut self.source, "/", root, &mut sink)?;

        let store = sink.store;
        debug!(
            files = store.len(),
            bytes = store.total_size(),
            "decoded archive"
        );
        Ok(store)
    }

    /// Decode every file and drop the reader.
    pub fn into_store(mut self) -> Result<ArchiveStore> {
        self.read_store()
    }

    /// Recover the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R> std::fmt::Debug for HpiReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HpiReader")
            .field("header", &self.header)
            .field("options", &self.options)
            .finish()
    }
}

/// Read and validate the archive header at the current position.
fn read_header<R: Read>(source: &mut R) -> Result<HpiHeader> {
    let mut raw = [0u8; HpiHeader::SIZE];
    source.read_exact(&mut raw[..4])?;
    if raw[..4] != HpiHeader::MAGIC {
        return Err(Error::InvalidMagic([raw[0], raw[1], raw[2], raw[3]]));
    }
    source.read_exact(&mut raw[4..])?;

    HpiHeader::read_from_bytes(&raw[..]).map_err(|_| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "header size mismatch",
        ))
    })
}

/// Decodes each file into the store.
struct StoreSink<'o> {
    store: ArchiveStore,
    options: &'o ReadOptions,
}

impl<R: Read + Seek> EntrySink<R> for StoreSink<'_> {
    fn file(&mut self, source: &mut R, path: String, record_offset: u64) -> Result<()> {
        let data = entry::decode_entry(source, record_offset, self.options)
            .map_err(|e| e.in_entry(&path))?;

        if self.store.insert(&path, data).is_some() {
            warn!(path = %path, "duplicate path, keeping the later entry");
        }
        Ok(())
    }
}

/// Collects placement records only.
#[derive(Default)]
struct ListSink {
    entries: Vec<EntryInfo>,
}

impl<R: Read + Seek> EntrySink<R> for ListSink {
    fn file(&mut self, source: &mut R, path: String, record_offset: u64) -> Result<()> {
        let placement =
            entry::read_placement(source, record_offset).map_err(|e| e.in_entry(&path))?;
        self.entries.push(EntryInfo::new(path, record_offset, &placement));
        Ok(())
    }
}
