//! Chunk headers.
//!
//! A file's data is a sequence of independently compressed chunks, each
//! introduced by the `SQSH` marker. The marker is followed by this header and
//! then `compressed_size` payload bytes.

use hpak_common::LeU32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Marker preceding every chunk header.
pub const CHUNK_MARKER: [u8; 4] = *b"SQSH";

/// Largest decompressed size of a single chunk.
pub const MAX_CHUNK_SIZE: u32 = 65536;

/// Chunk header (without the marker).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct ChunkHeader {
    /// Format version byte (not interpreted)
    pub version: u8,
    /// Compression method, see [`super::CompressionMethod`]
    pub method: u8,
    /// Non-zero when the payload is obfuscated
    pub obfuscated: u8,
    /// Payload size on disk
    pub compressed_size: LeU32,
    /// Size after decompression
    pub decompressed_size: LeU32,
    /// Wrapping sum of the on-disk payload bytes
    pub checksum: LeU32,
}

impl ChunkHeader {
    /// Size of the header on disk, marker excluded.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Check if the payload must be de-obfuscated.
    #[inline]
    pub fn is_obfuscated(&self) -> bool {
        self.obfuscated != 0
    }
}

/// Number of chunks a file of `size` decompressed bytes is split into.
#[inline]
pub fn chunk_count(size: u32) -> u32 {
    size.div_ceil(MAX_CHUNK_SIZE)
}

/// Checksum of an on-disk chunk payload.
pub fn payload_checksum(payload: &[u8]) -> u32 {
    payload
        .iter()
        .fold(0u32, |sum, &b| sum.wrapping_add(b as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(ChunkHeader::SIZE, 15);
    }

    #[test]
    fn test_chunk_count_boundaries() {
        assert_eq!(chunk_count(0), 0);
        assert_eq!(chunk_count(1), 1);
        assert_eq!(chunk_count(MAX_CHUNK_SIZE - 1), 1);
        assert_eq!(chunk_count(MAX_CHUNK_SIZE), 1);
        assert_eq!(chunk_count(MAX_CHUNK_SIZE + 1), 2);
        assert_eq!(chunk_count(MAX_CHUNK_SIZE * 3), 3);
        assert_eq!(chunk_count(u32::MAX), 65536);
    }

    #[test]
    fn test_payload_checksum() {
        assert_eq!(payload_checksum(&[]), 0);
        assert_eq!(payload_checksum(&[1, 2, 3]), 6);
        assert_eq!(payload_checksum(&[0xFF; 4]), 0x3FC);
    }
}
