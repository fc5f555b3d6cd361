//! Byte scanning utilities.
//!
//! Pattern searches go through memchr, which picks SIMD implementations
//! (AVX2, SSE2, NEON) at runtime.

use std::io::{Read, Seek};

use crate::{Error, Result, SeekReadExt};

/// Block size for streaming scans.
const SCAN_BLOCK: usize = 4096;

/// Find the first occurrence of `needle` in `haystack`.
#[inline]
pub fn find_pattern(needle: &[u8], haystack: &[u8]) -> Option<usize> {
    memchr::memmem::find(haystack, needle)
}

/// Scan forward from the current position of `reader` for `pattern`.
///
/// At most `limit` bytes may be skipped before the pattern starts. On
/// success the reader is left positioned just past the pattern and the
/// absolute offset of the pattern is returned. Reaching the end of the
/// source is an I/O error; exceeding `limit` is [`Error::PatternNotFound`].
pub fn scan_for_pattern<R>(reader: &mut R, pattern: &[u8], limit: u64) -> Result<u64>
where
    R: Read + Seek + ?Sized,
{
    debug_assert!(!pattern.is_empty());

    let start = reader.tell()?;
    let mut window: Vec<u8> = Vec::with_capacity(SCAN_BLOCK + pattern.len());
    // Absolute offset of window[0]
    let mut base = start;
    let mut block = [0u8; SCAN_BLOCK];

    loop {
        let n = reader.read(&mut block)?;
        if n == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "end of source while scanning for pattern",
            )));
        }
        window.extend_from_slice(&block[..n]);

        if let Some(pos) = find_pattern(pattern, &window) {
            let found = base + pos as u64;
            if found - start > limit {
                break;
            }
            reader.seek_to(found + pattern.len() as u64)?;
            return Ok(found);
        }

        // Keep a partial match that may straddle the next block
        let keep = (pattern.len() - 1).min(window.len());
        let consumed = window.len() - keep;
        window.drain(..consumed);
        base += consumed as u64;

        if base - start > limit {
            break;
        }
    }

    Err(Error::PatternNotFound {
        pattern: pattern.to_vec(),
        start,
        scanned: limit,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_find_pattern() {
        assert_eq!(find_pattern(b"SQSH", b"..SQSH.."), Some(2));
        assert_eq!(find_pattern(b"SQSH", b"SQS"), None);
    }

    #[test]
    fn test_scan_leaves_reader_after_pattern() {
        let data = b"\x01\x02\x03SQSHpayload";
        let mut cursor = Cursor::new(&data[..]);

        assert_eq!(scan_for_pattern(&mut cursor, b"SQSH", 64).unwrap(), 3);
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn test_scan_from_current_position() {
        let data = b"SQSH....SQSH";
        let mut cursor = Cursor::new(&data[..]);
        cursor.set_position(1);

        assert_eq!(scan_for_pattern(&mut cursor, b"SQSH", 64).unwrap(), 8);
    }

    #[test]
    fn test_scan_across_block_boundary() {
        let mut data = vec![0xAAu8; SCAN_BLOCK - 2];
        data.extend_from_slice(b"SQSH");
        data.extend_from_slice(&[0u8; 16]);
        let mut cursor = Cursor::new(&data[..]);

        let found = scan_for_pattern(&mut cursor, b"SQSH", 1 << 20).unwrap();
        assert_eq!(found, (SCAN_BLOCK - 2) as u64);
        assert_eq!(cursor.position(), (SCAN_BLOCK + 2) as u64);
    }

    #[test]
    fn test_scan_respects_limit() {
        let mut data = vec![0u8; 100];
        data.extend_from_slice(b"SQSH");
        let mut cursor = Cursor::new(&data[..]);

        let err = scan_for_pattern(&mut cursor, b"SQSH", 50).unwrap_err();
        assert!(matches!(err, Error::PatternNotFound { .. }));

        cursor.set_position(0);
        assert_eq!(scan_for_pattern(&mut cursor, b"SQSH", 100).unwrap(), 100);
    }

    #[test]
    fn test_scan_hits_end_of_source() {
        let data = [0u8; 10];
        let mut cursor = Cursor::new(&data[..]);

        assert!(scan_for_pattern(&mut cursor, b"SQSH", 1 << 20).unwrap_err().is_io());
    }
}
