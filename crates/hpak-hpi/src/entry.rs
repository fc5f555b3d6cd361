//! File entries: placement records and the per-file decode.

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use hpak_common::SeekReadExt;
use tracing::trace;

use crate::decompress;
use crate::format::{chunk_count, CompressionMethod, FilePlacement};
use crate::{Error, ReadOptions, Result};

/// A file within an HPI archive.
///
/// This contains metadata about the file, not the file data itself.
/// Use [`crate::HpiReader::entries`] to list them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EntryInfo {
    /// Path within the archive, as stored (case preserved).
    path: String,
    /// Offset of the placement record.
    record_offset: u64,
    /// Offset of the chunk stream.
    data_offset: u32,
    /// Decompressed size in bytes.
    size: u32,
    /// Raw compression flag from the placement record.
    compression: u8,
}

impl EntryInfo {
    pub(crate) fn new(path: String, record_offset: u64, placement: &FilePlacement) -> Self {
        Self {
            path,
            record_offset,
            data_offset: placement.data_offset.get(),
            size: placement.decompressed_size.get(),
            compression: placement.compression,
        }
    }

    /// Get the path within the archive.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the offset of the placement record.
    #[inline]
    pub fn record_offset(&self) -> u64 {
        self.record_offset
    }

    /// Get the offset of the chunk stream.
    #[inline]
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// Get the decompressed size in bytes.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Get the number of chunks the file is stored in.
    #[inline]
    pub fn chunk_count(&self) -> u32 {
        chunk_count(self.size)
    }

    /// Get the compression flag from the placement record.
    ///
    /// This is advisory; every chunk declares its own method.
    pub fn compression(&self) -> Option<CompressionMethod> {
        CompressionMethod::try_from(self.compression).ok()
    }

    /// Get the relative output path for extraction.
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(self.path.trim_start_matches('/'))
    }

    /// Get the file extension, if any.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.path)
            .extension()
            .and_then(|ext| ext.to_str())
    }
}

/// Read the placement record at `record_offset`.
pub(crate) fn read_placement<R: Read + Seek>(
    source: &mut R,
    record_offset: u64,
) -> Result<FilePlacement> {
    Ok(source.read_struct_at(record_offset)?)
}

/// Decode the file whose placement record is at `record_offset`.
pub(crate) fn decode_entry<R: Read + Seek>(
    source: &mut R,
    record_offset: u64,
    options: &ReadOptions,
) -> Result<Vec<u8>> {
    let placement = read_placement(source, record_offset)?;
    let size = placement.decompressed_size.get();
    let chunks = chunk_count(size);

    trace!(
        record_offset,
        data_offset = placement.data_offset.get(),
        size,
        chunks,
        flag = placement.compression,
        "decoding file"
    );

    if chunks == 0 {
        return Ok(Vec::new());
    }

    let data_offset = placement.data_offset.get() as u64;
    source.seek_to(data_offset)?;
    let data = decompress::decode_chunks(source, chunks, size as usize, options)?;

    if data.len() != size as usize {
        return Err(Error::SizeMismatch {
            offset: data_offset,
            expected: size as u64,
            actual: data.len() as u64,
        });
    }

    Ok(data)
}
