//! Chunk decompression.
//!
//! Each chunk moves through `scan for marker -> read header -> read payload
//! -> de-obfuscate (optional) -> decompress` exactly once.

use std::io::{Read, Seek};

use flate2::read::{DeflateDecoder, ZlibDecoder};
use hpak_common::{scan, ReadExt};
use tracing::trace;

use crate::cipher;
use crate::format::{payload_checksum, ChunkHeader, CompressionMethod, CHUNK_MARKER, MAX_CHUNK_SIZE};
use crate::{Error, ReadOptions, Result};

/// Upper bound on a chunk's on-disk payload. Incompressible data can grow
/// slightly under DEFLATE; anything past twice the chunk size is corrupt.
const MAX_COMPRESSED_SIZE: u32 = MAX_CHUNK_SIZE * 2;

/// Most bytes reserved up front for a file's output. Declared sizes are
/// untrusted; larger files grow the buffer as chunks decode.
const MAX_PREALLOC: usize = MAX_CHUNK_SIZE as usize * 16;

/// A chunk read from disk but not yet decoded.
struct RawChunk {
    /// Offset of the chunk marker
    offset: u64,
    header: ChunkHeader,
    payload: Vec<u8>,
}

impl RawChunk {
    /// Locate the next chunk marker and read the header and payload after it.
    fn read<R: Read + Seek>(source: &mut R, options: &ReadOptions) -> Result<Self> {
        let offset = scan::scan_for_pattern(source, &CHUNK_MARKER, options.max_marker_scan)
            .map_err(|e| match e {
                hpak_common::Error::PatternNotFound { start, scanned, .. } => {
                    Error::ChunkMarkerNotFound {
                        offset: start,
                        limit: scanned,
                    }
                }
                other => Error::Common(other),
            })?;

        let header: ChunkHeader = source.read_struct()?;
        let compressed = header.compressed_size.get();
        let decompressed = header.decompressed_size.get();
        if compressed > MAX_COMPRESSED_SIZE || decompressed > MAX_CHUNK_SIZE {
            return Err(Error::ChunkTooLarge {
                offset,
                compressed,
                decompressed,
            });
        }

        let payload = source.read_vec(compressed as usize)?;

        Ok(Self {
            offset,
            header,
            payload,
        })
    }

    fn verify_checksum(&self) -> Result<()> {
        let actual = payload_checksum(&self.payload);
        let expected = self.header.checksum.get();
        if actual != expected {
            return Err(Error::ChecksumMismatch {
                offset: self.offset,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// De-obfuscate if flagged, then decompress by the declared method.
    fn decode(mut self) -> Result<Vec<u8>> {
        if self.header.is_obfuscated() {
            cipher::deobfuscate_in_place(&mut self.payload);
        }

        let expected = self.header.decompressed_size.get() as usize;
        let method = CompressionMethod::try_from(self.header.method).map_err(|method| {
            Error::UnsupportedCompression {
                method,
                offset: self.offset,
            }
        })?;

        let output = match method {
            CompressionMethod::Stored => self.payload,
            CompressionMethod::Lz77 => {
                return Err(Error::UnsupportedCompression {
                    method: self.header.method,
                    offset: self.offset,
                })
            }
            CompressionMethod::Zlib => decompress_zlib_sized(&self.payload, expected)?,
        };

        if output.len() != expected {
            return Err(Error::SizeMismatch {
                offset: self.offset,
                expected: expected as u64,
                actual: output.len() as u64,
            });
        }

        Ok(output)
    }
}

/// Decode `count` consecutive chunks starting at the current position of
/// `source`, returning their concatenated output.
pub(crate) fn decode_chunks<R: Read + Seek>(
    source: &mut R,
    count: u32,
    size_hint: usize,
    options: &ReadOptions,
) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(size_hint.min(MAX_PREALLOC));

    for index in 0..count {
        let chunk = RawChunk::read(source, options)?;
        trace!(
            index,
            offset = chunk.offset,
            method = chunk.header.method,
            obfuscated = chunk.header.is_obfuscated(),
            compressed = chunk.header.compressed_size.get(),
            decompressed = chunk.header.decompressed_size.get(),
            "chunk"
        );

        if options.verify_checksums {
            chunk.verify_checksum()?;
        }

        output.extend_from_slice(&chunk.decode()?);
    }

    Ok(output)
}

/// Decompress a zlib stream, or raw DEFLATE if no zlib header is present.
///
/// A payload that looks like zlib but fails to inflate as zlib is retried as
/// raw DEFLATE, since two DEFLATE bytes can pass the header check by chance.
/// At most `expected_size + 1` bytes are produced so a corrupt stream cannot
/// balloon; the caller checks the final length.
pub fn decompress_zlib_sized(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let limit = expected_size as u64 + 1;
    let capacity = expected_size.min(MAX_PREALLOC);

    if has_zlib_header(data) {
        match inflate(ZlibDecoder::new(data), limit, capacity) {
            Ok(output) => return Ok(output),
            Err(e) => trace!(error = %e, "zlib inflate failed, retrying as raw deflate"),
        }
    }

    inflate(DeflateDecoder::new(data), limit, capacity)
        .map_err(|e| Error::Decompression(e.to_string()))
}

fn inflate<D: Read>(decoder: D, limit: u64, capacity: usize) -> std::io::Result<Vec<u8>> {
    let mut output = Vec::with_capacity(capacity);
    decoder.take(limit).read_to_end(&mut output)?;
    Ok(output)
}

/// Check for a zlib CMF/FLG pair: DEFLATE method and a valid header check.
fn has_zlib_header(data: &[u8]) -> bool {
    match data {
        [cmf, flg, ..] => cmf & 0x0F == 8 && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}
