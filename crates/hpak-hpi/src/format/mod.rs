//! HPI on-disk structures.
//!
//! Every record is addressed by an absolute byte offset from the start of
//! the archive. All integers are little-endian `u32`, stored unaligned.

mod chunk;
mod directory;
mod header;

pub use chunk::{chunk_count, payload_checksum, ChunkHeader, CHUNK_MARKER, MAX_CHUNK_SIZE};
pub use directory::{DirectoryEntry, DirectoryIndex, FilePlacement};
pub use header::HpiHeader;

/// Compression methods declared by chunk headers and placement records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum CompressionMethod {
    /// No compression (stored).
    Stored = 0,
    /// Legacy LZ77 variant. Recognized but never decoded.
    Lz77 = 1,
    /// zlib/DEFLATE compression.
    Zlib = 2,
}

impl TryFrom<u8> for CompressionMethod {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Stored),
            1 => Ok(Self::Lz77),
            2 => Ok(Self::Zlib),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Stored => "stored",
            Self::Lz77 => "lz77",
            Self::Zlib => "zlib",
        })
    }
}
