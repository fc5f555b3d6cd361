//! Archive header.

use hpak_common::LeU32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// The fixed 20-byte header at offset 0.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct HpiHeader {
    /// Archive marker, always `HAPI`
    pub magic: [u8; 4],
    /// `BANK` for saved games, `00 00 01 00` for regular archives
    pub save_marker: [u8; 4],
    /// Size of the directory block in bytes (informational)
    pub directory_size: LeU32,
    /// Header decryption key. Parsed but never applied.
    pub header_key: LeU32,
    /// Offset of the root directory index
    pub directory_offset: LeU32,
}

impl HpiHeader {
    /// Archive marker bytes.
    pub const MAGIC: [u8; 4] = *b"HAPI";

    /// Save-game marker bytes.
    pub const SAVE_MARKER: [u8; 4] = *b"BANK";

    /// Marker for a regular archive.
    pub const ARCHIVE_MARKER: [u8; 4] = [0x00, 0x00, 0x01, 0x00];

    /// Size of the header on disk.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Check if this archive is a saved game.
    #[inline]
    pub fn is_save(&self) -> bool {
        self.save_marker == Self::SAVE_MARKER
    }

    /// Offset of the root directory index.
    #[inline]
    pub fn root_offset(&self) -> u32 {
        self.directory_offset.get()
    }

    /// The raw header key.
    #[inline]
    pub fn key(&self) -> u32 {
        self.header_key.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(HpiHeader::SIZE, 20);
    }

    #[test]
    fn test_header_fields() {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"HAPIBANK");
        raw.extend_from_slice(&0x100u32.to_le_bytes());
        raw.extend_from_slice(&0x7du32.to_le_bytes());
        raw.extend_from_slice(&20u32.to_le_bytes());

        let header = HpiHeader::read_from_bytes(&raw).unwrap();
        assert_eq!(header.magic, HpiHeader::MAGIC);
        assert!(header.is_save());
        assert_eq!(header.directory_size.get(), 0x100);
        assert_eq!(header.key(), 0x7d);
        assert_eq!(header.root_offset(), 20);
    }
}
