//! Binary reading over streams.
//!
//! [`ReadExt`] reads fixed-layout structures from any reader; [`SeekReadExt`]
//! adds the offset-addressed reads that pointer-based formats need, where
//! every record is located by an absolute position in the source.

use std::io::{Read, Seek, SeekFrom};

use zerocopy::FromBytes;

use crate::{Error, Result};

/// Block size used when reading zero-terminated strings.
const CSTRING_BLOCK: usize = 64;

/// Trait for reading binary data from streams.
///
/// This extends `Read` with methods for reading fixed-size structures.
pub trait ReadExt: Read {
    /// Read a structure from the stream.
    ///
    /// The structure's layout must already be little-endian and unaligned
    /// (see [`crate::LeU32`]), so no conversion happens after the copy.
    fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let mut bytes = vec![0u8; size];
        self.read_exact(&mut bytes)?;
        T::read_from_bytes(&bytes).map_err(|_| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "struct size mismatch",
            ))
        })
    }

    /// Read exactly `count` bytes into a new buffer.
    fn read_vec(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; count];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Read a single byte.
    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    /// Expect specific magic bytes.
    fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_vec(expected.len())?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual,
            });
        }
        Ok(())
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

/// Offset-addressed reads for seekable sources.
pub trait SeekReadExt: Read + Seek {
    /// Seek to an absolute position.
    fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Get the current position in the source.
    fn tell(&mut self) -> Result<u64> {
        Ok(self.stream_position()?)
    }

    /// Seek to `offset` and read a structure there.
    fn read_struct_at<T: FromBytes>(&mut self, offset: u64) -> Result<T> {
        self.seek_to(offset)?;
        self.read_struct()
    }

    /// Read the zero-terminated byte string starting at `offset`.
    ///
    /// The terminator is consumed but not returned. Strings longer than
    /// `limit` bytes fail with [`Error::MissingNullTerminator`]; running out
    /// of input first is an I/O error.
    fn read_cstring_at(&mut self, offset: u64, limit: usize) -> Result<Vec<u8>> {
        self.seek_to(offset)?;

        let mut out = Vec::new();
        let mut block = [0u8; CSTRING_BLOCK];
        loop {
            let n = self.read(&mut block)?;
            if n == 0 {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "end of source inside string",
                )));
            }
            if let Some(nul) = memchr::memchr(0, &block[..n]) {
                out.extend_from_slice(&block[..nul]);
                if out.len() > limit {
                    break;
                }
                self.seek_to(offset + out.len() as u64 + 1)?;
                return Ok(out);
            }
            out.extend_from_slice(&block[..n]);
            if out.len() > limit {
                break;
            }
        }

        Err(Error::MissingNullTerminator { offset, limit })
    }
}

impl<R: Read + Seek + ?Sized> SeekReadExt for R {}
